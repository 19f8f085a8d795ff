//! The typed record of one scraped episode.

use crate::error::ParseError;

use super::builder::EpisodeEntry;

/// Attribute names used on the playable control and in `EpisodeEntry`.
pub mod keys {
    pub const URL: &str = "url";
    pub const DIFFUSION_TITLE: &str = "diffusion-title";
    pub const EMISSION_TITLE: &str = "emission-title";
    pub const START_TIME: &str = "start-time";
    pub const END_TIME: &str = "end-time";
    pub const DIFFUSION_PATH: &str = "diffusion-path";
    pub const AUTHOR: &str = "author";
    pub const HREF: &str = "href";
}

/// One playable episode as found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEpisodeRecord {
    /// Source media URL.
    pub url: String,
    pub diffusion_title: String,
    /// Title of the parent show.
    pub emission_title: String,
    /// Unix seconds.
    pub start_time: i64,
    /// Unix seconds, never before `start_time`.
    pub end_time: i64,
    /// Absolute URL of the episode's page on the site.
    pub diffusion_path: String,
    pub author: Option<String>,
    pub href: Option<String>,
}

impl RawEpisodeRecord {
    pub fn duration_secs(&self) -> i64 {
        self.end_time.saturating_sub(self.start_time)
    }
}

fn required_text(entry: &EpisodeEntry, key: &'static str) -> Result<String, ParseError> {
    entry
        .text(key)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ParseError::Attribute(key))
}

fn required_integer(entry: &EpisodeEntry, key: &'static str) -> Result<i64, ParseError> {
    entry.integer(key).ok_or(ParseError::Attribute(key))
}

impl TryFrom<EpisodeEntry> for RawEpisodeRecord {
    type Error = ParseError;

    fn try_from(entry: EpisodeEntry) -> Result<Self, Self::Error> {
        let start_time = required_integer(&entry, keys::START_TIME)?;
        let end_time = required_integer(&entry, keys::END_TIME)?;
        if end_time.checked_sub(start_time).map_or(true, |d| d < 0) {
            return Err(ParseError::TimeWindow {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            url: required_text(&entry, keys::URL)?,
            diffusion_title: required_text(&entry, keys::DIFFUSION_TITLE)?,
            emission_title: required_text(&entry, keys::EMISSION_TITLE)?,
            start_time,
            end_time,
            diffusion_path: required_text(&entry, keys::DIFFUSION_PATH)?,
            author: entry.text(keys::AUTHOR).map(str::to_string),
            href: entry.text(keys::HREF).map(str::to_string),
        })
    }
}
