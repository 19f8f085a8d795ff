//! Extension extraction from URL path.

/// Extracts the file extension of the last path segment of a URL.
///
/// Returns `None` if the URL cannot be parsed, the path is empty/root, or the
/// last segment has no `.`-delimited suffix.
pub fn extension_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_string())
}
