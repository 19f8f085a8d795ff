//! Which listing pages a run covers.

/// Page selection as given by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageSpec {
    Single(u32),
    List(Vec<u32>),
    /// Page 1 only.
    #[default]
    Default,
}

impl PageSpec {
    /// Normalized page numbers: zeros dropped, duplicates dropped keeping the
    /// first occurrence, never empty (falls back to `[1]`).
    pub fn pages(&self) -> Vec<u32> {
        let raw: &[u32] = match self {
            PageSpec::Single(n) => std::slice::from_ref(n),
            PageSpec::List(list) => list,
            PageSpec::Default => &[],
        };
        let mut pages = Vec::with_capacity(raw.len());
        for &page in raw {
            if page > 0 && !pages.contains(&page) {
                pages.push(page);
            }
        }
        if pages.is_empty() {
            pages.push(1);
        }
        pages
    }
}

impl From<Vec<u32>> for PageSpec {
    fn from(pages: Vec<u32>) -> Self {
        if pages.is_empty() {
            PageSpec::Default
        } else {
            PageSpec::List(pages)
        }
    }
}

impl From<u32> for PageSpec {
    fn from(page: u32) -> Self {
        PageSpec::Single(page)
    }
}
