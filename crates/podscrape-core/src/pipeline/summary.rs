//! Per-page and per-run accounting.

use crate::error::{DownloadError, PageError};

/// What the per-entry action did with one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Fetched; `tagged` is false when writing tags failed.
    Downloaded { tagged: bool },
    /// Already present on disk.
    Skipped,
    /// Recorded in the informational playlist.
    Listed,
}

/// Result of one listing page.
#[derive(Debug, Default)]
pub struct PageReport {
    pub page: u32,
    /// Playable episodes found on the page.
    pub entries: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub listed: usize,
    pub failed: usize,
    /// Set when the page itself could not be fetched or parsed.
    pub error: Option<PageError>,
}

impl PageReport {
    pub(crate) fn new(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub(crate) fn failed_page(error: PageError) -> Self {
        Self {
            page: error.page(),
            error: Some(error),
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, outcome: &Result<EntryOutcome, DownloadError>) {
        match outcome {
            Ok(EntryOutcome::Downloaded { .. }) => self.downloaded += 1,
            Ok(EntryOutcome::Skipped) => self.skipped += 1,
            Ok(EntryOutcome::Listed) => self.listed += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.failed == 0
    }
}

/// Everything a run did, pages sorted by number.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub pages: Vec<PageReport>,
    /// Page tasks that panicked or were cancelled before reporting.
    pub lost_tasks: usize,
}

impl RunSummary {
    pub(crate) fn push(&mut self, report: PageReport) {
        let at = self.pages.partition_point(|p| p.page < report.page);
        self.pages.insert(at, report);
    }

    pub fn entries(&self) -> usize {
        self.pages.iter().map(|p| p.entries).sum()
    }

    pub fn downloaded(&self) -> usize {
        self.pages.iter().map(|p| p.downloaded).sum()
    }

    pub fn skipped(&self) -> usize {
        self.pages.iter().map(|p| p.skipped).sum()
    }

    pub fn listed(&self) -> usize {
        self.pages.iter().map(|p| p.listed).sum()
    }

    pub fn failed(&self) -> usize {
        self.pages.iter().map(|p| p.failed).sum()
    }

    pub fn page_errors(&self) -> impl Iterator<Item = &PageError> {
        self.pages.iter().filter_map(|p| p.error.as_ref())
    }

    pub fn is_ok(&self) -> bool {
        self.lost_tasks == 0 && self.pages.iter().all(PageReport::is_ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_stay_sorted() {
        let mut summary = RunSummary::default();
        summary.push(PageReport::new(3));
        summary.push(PageReport::new(1));
        summary.push(PageReport::new(2));
        let pages: Vec<u32> = summary.pages.iter().map(|p| p.page).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[test]
    fn totals_add_up_across_pages() {
        let mut one = PageReport::new(1);
        one.entries = 3;
        one.record(&Ok(EntryOutcome::Downloaded { tagged: true }));
        one.record(&Ok(EntryOutcome::Skipped));
        one.record(&Err(DownloadError::Task("join".into())));
        let mut two = PageReport::new(2);
        two.entries = 1;
        two.record(&Ok(EntryOutcome::Downloaded { tagged: false }));

        let mut summary = RunSummary::default();
        summary.push(one);
        summary.push(two);
        assert_eq!(summary.entries(), 4);
        assert_eq!(summary.downloaded(), 2);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.is_ok());
    }

    #[test]
    fn failed_page_carries_its_error() {
        let report = PageReport::failed_page(PageError::Task {
            page: 7,
            reason: "boom".into(),
        });
        assert_eq!(report.page, 7);
        let mut summary = RunSummary::default();
        summary.push(report);
        assert_eq!(summary.page_errors().count(), 1);
        assert!(!summary.is_ok());
    }
}
