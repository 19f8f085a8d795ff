//! Descriptive tags derived from an episode record.

use chrono::{DateTime, Datelike};

use super::record::RawEpisodeRecord;

/// ID3v1 genre index for "Podcast", in the `(n)` form of `TCON`.
pub const PODCAST_GENRE: &str = "(186)";

/// Tags written into a downloaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    pub album: String,
    pub title: String,
    pub artist: Option<String>,
    pub year: i32,
    /// `HH:MM:SS`.
    pub length: String,
    pub genre: &'static str,
    pub comment: String,
    pub copyright: Option<String>,
}

impl TagSet {
    pub fn from_record(record: &RawEpisodeRecord, copyright: Option<&str>) -> Self {
        let year = DateTime::from_timestamp(record.start_time, 0)
            .map(|d| d.year())
            .unwrap_or(1970);
        Self {
            album: record.emission_title.clone(),
            title: record.diffusion_title.clone(),
            artist: record.author.clone(),
            year,
            length: format_duration(record.duration_secs()),
            genre: PODCAST_GENRE,
            comment: record.diffusion_path.clone(),
            copyright: copyright.map(str::to_string),
        }
    }
}

/// Formats a number of seconds as `HH:MM:SS`. Hours do not wrap at 24.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
