//! Episode extraction from a listing page.
//!
//! Every `div.diffusions-list article` is one broadcast segment. Only articles
//! carrying a playable control (`button.playable` with `data-*` episode
//! attributes) are downloadable; live or unavailable segments have none and
//! are skipped.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::episode::{
    integer, keys, AttributeReader, AttributeValue, DataAttribute, DownloadEntryBuilder,
    EpisodeEntry, RawEpisodeRecord,
};
use crate::error::ParseError;
use crate::url_model;

const ARTICLE_SELECTOR: &str = "div.diffusions-list article";
const PLAY_BUTTON_SELECTOR: &str = "button[data-diffusion-title].playable";
const AUTHOR_SELECTOR: &str = "span.rich-section-list-item-content-infos-author > a";
const VISUAL_LINK_SELECTOR: &str = "div.rich-section-list-item-visual > a";

/// Extracts episode records from listing pages of one site.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    domain: Url,
}

struct Selectors {
    article: Selector,
    play_button: Selector,
    author: Selector,
    visual_link: Selector,
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector {
        selector: css,
        reason: e.to_string(),
    })
}

impl Selectors {
    fn new() -> Result<Self, ParseError> {
        Ok(Self {
            article: selector(ARTICLE_SELECTOR)?,
            play_button: selector(PLAY_BUTTON_SELECTOR)?,
            author: selector(AUTHOR_SELECTOR)?,
            visual_link: selector(VISUAL_LINK_SELECTOR)?,
        })
    }
}

impl PageExtractor {
    /// Relative links on the pages are resolved against the scheme and host
    /// of `listing_url`.
    pub fn new(listing_url: &Url) -> Result<Self, ParseError> {
        let domain = url_model::site_domain(listing_url)
            .ok_or_else(|| ParseError::NoDomain(listing_url.to_string()))?;
        Ok(Self { domain })
    }

    pub fn domain(&self) -> &Url {
        &self.domain
    }

    /// Parses `html` and returns the playable episodes in document order.
    pub fn extract(&self, html: &str) -> Result<Vec<RawEpisodeRecord>, ParseError> {
        let document = Html::parse_document(html);
        self.extract_document(&document)
    }

    pub fn extract_document(&self, document: &Html) -> Result<Vec<RawEpisodeRecord>, ParseError> {
        let selectors = Selectors::new()?;
        let mut records = Vec::new();

        for (index, article) in document.select(&selectors.article).enumerate() {
            let Some(button) = article.select(&selectors.play_button).next() else {
                continue;
            };
            let entry = self.read_entry(&selectors, article, button);
            match RawEpisodeRecord::try_from(entry) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(article = index, "skipping episode: {}", e),
            }
        }

        Ok(records)
    }

    fn read_entry(
        &self,
        selectors: &Selectors,
        article: ElementRef<'_>,
        button: ElementRef<'_>,
    ) -> EpisodeEntry {
        let author = article.select(&selectors.author).next().and_then(|a| {
            DownloadEntryBuilder::with_properties(a)
                .extract_with("title", |raw| {
                    raw.filter(|s| !s.trim().is_empty())
                        .map(AttributeValue::Text)
                })
                .build()
                .get("title")
                .cloned()
        });
        let href = article.select(&selectors.visual_link).next().and_then(|a| {
            DownloadEntryBuilder::with_properties(a)
                .extract_with("href", |raw| {
                    raw.and_then(|link| url_model::resolve_link(&self.domain, &link))
                        .map(AttributeValue::Text)
                })
                .build()
                .get("href")
                .cloned()
        });

        let mut entry = DownloadEntryBuilder::new(button, DataAttribute)
            .extract(keys::URL)
            .extract(keys::DIFFUSION_TITLE)
            .extract(keys::EMISSION_TITLE)
            .extract_with(keys::START_TIME, integer)
            .extract_with(keys::END_TIME, integer)
            .extract_with(keys::DIFFUSION_PATH, |raw| {
                raw.and_then(|path| url_model::resolve_link(&self.domain, &path))
                    .map(AttributeValue::Text)
            })
            .append(keys::AUTHOR, author)
            .append(keys::HREF, href)
            .build();

        let article_start = DataAttribute
            .read(&article, keys::START_TIME)
            .and_then(|s| s.parse::<i64>().ok());
        rebase_on_article(&mut entry, article_start);
        entry
    }
}

/// One-shot extraction of `html` found at (or under) `listing_url`.
pub fn extract_episodes(html: &str, listing_url: &Url) -> Result<Vec<RawEpisodeRecord>, ParseError> {
    PageExtractor::new(listing_url)?.extract(html)
}

/// The article's own start time is authoritative (the play button may use a
/// different base); the button only contributes the duration.
///
/// A window that does not fit in `i64` loses its end time, so the record
/// conversion rejects the entry.
fn rebase_on_article(entry: &mut EpisodeEntry, article_start: Option<i64>) {
    let (Some(start), Some(button_start), Some(button_end)) = (
        article_start,
        entry.integer(keys::START_TIME),
        entry.integer(keys::END_TIME),
    ) else {
        return;
    };
    let end = button_end
        .checked_sub(button_start)
        .and_then(|duration| start.checked_add(duration));
    entry.insert(keys::START_TIME, Some(AttributeValue::Integer(start)));
    entry.insert(keys::END_TIME, end.map(AttributeValue::Integer));
}
