//! URL modeling and filename derivation.
//!
//! Derives safe local file names for episodes from their title and source URL,
//! and builds the listing page URLs.

mod path;
mod sanitize;

pub use path::extension_from_url_path;
pub use sanitize::slugify;

use url::Url;

/// Query parameter carrying the listing page number.
const PAGE_PARAM: &str = "p";

/// Scheme + host (+ port) of `url`, as a URL with root path.
///
/// Relative links found on a listing page (e.g. `data-diffusion-path`) are
/// resolved against this.
pub fn site_domain(url: &Url) -> Option<Url> {
    if url.cannot_be_a_base() || url.host().is_none() {
        return None;
    }
    url.join("/").ok()
}

/// URL of listing page `page`.
///
/// Page 1 is the listing URL unchanged, so it stays identical to the base URL;
/// later pages append `p=<page>`.
pub fn page_url(listing: &Url, page: u32) -> Url {
    let mut url = listing.clone();
    if page > 1 {
        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &page.to_string());
    }
    url
}

/// Resolves a possibly relative link against the site domain.
pub fn resolve_link(domain: &Url, link: &str) -> Option<String> {
    domain.join(link).ok().map(String::from)
}
