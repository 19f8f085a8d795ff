//! Canonical naming of an episode on disk.

use chrono::DateTime;
use sha2::{Digest, Sha256};

use crate::config::NameCollision;
use crate::url_model;

use super::record::RawEpisodeRecord;

/// Used when the media URL path carries no extension.
const DEFAULT_EXTENSION: &str = "mp3";

/// Hex digits of the URL hash appended under `NameCollision::UrlHash`.
const URL_HASH_LEN: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamingOptions {
    pub collision: NameCollision,
}

/// Where and under which name one episode is downloaded or listed.
///
/// Resolving the same record twice yields the same context; the name doubles
/// as the already-downloaded check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadContext {
    name: String,
    file_name: String,
    url: String,
    extra: RawEpisodeRecord,
}

impl DownloadContext {
    pub fn resolve(record: RawEpisodeRecord, naming: &NamingOptions) -> Self {
        let mut name = format!(
            "{}-{}",
            date_string(record.start_time),
            url_model::slugify(&record.diffusion_title)
        );
        if naming.collision == NameCollision::UrlHash {
            let digest = hex::encode(Sha256::digest(record.url.as_bytes()));
            name.push('-');
            name.push_str(&digest[..URL_HASH_LEN]);
        }
        let ext = url_model::extension_from_url_path(&record.url)
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        let file_name = format!("{name}.{ext}");
        Self {
            name,
            file_name,
            url: record.url.clone(),
            extra: record,
        }
    }

    /// `YYYY-MM-DD-<slug>`, without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The record this context was resolved from.
    pub fn extra(&self) -> &RawEpisodeRecord {
        &self.extra
    }
}

/// UTC date of a Unix timestamp as `YYYY-MM-DD`.
pub fn date_string(unix_secs: i64) -> String {
    DateTime::from_timestamp(unix_secs, 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "0000-00-00".to_string())
}
