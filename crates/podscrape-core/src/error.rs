//! Error types for the scrape/download pipeline.
//!
//! Page-level failures (`PageError`) degrade one page to zero entries,
//! `DownloadError` fails one episode, `TagError` is only logged and
//! `PipelineError` stops the run before anything starts.

use std::path::PathBuf;
use thiserror::Error;

use crate::retry::TransferError;

/// Expected markup or URL structure is absent.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A playable control lacks a required attribute, or it does not parse.
    #[error("missing or malformed attribute `{0}`")]
    Attribute(&'static str),
    /// Episode ends before it starts.
    #[error("episode ends before it starts ({start} > {end})")]
    TimeWindow { start: i64, end: i64 },
    /// The listing URL has no scheme/host to resolve relative links against.
    #[error("listing URL has no domain: {0}")]
    NoDomain(String),
    #[error("invalid selector `{selector}`: {reason}")]
    Selector {
        selector: &'static str,
        reason: String,
    },
}

/// Failure fetching or extracting one listing page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("page {page}: {source}")]
    Transport {
        page: u32,
        #[source]
        source: TransferError,
    },
    #[error("page {page}: {source}")]
    Parse {
        page: u32,
        #[source]
        source: ParseError,
    },
    #[error("page {page}: task failed: {reason}")]
    Task { page: u32, reason: String },
}

impl PageError {
    pub fn page(&self) -> u32 {
        match self {
            PageError::Transport { page, .. }
            | PageError::Parse { page, .. }
            | PageError::Task { page, .. } => *page,
        }
    }
}

/// Failure downloading one episode. The partial file is already removed.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download of {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransferError,
    },
    #[error("{}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("download task failed: {0}")]
    Task(String),
}

/// The tag library rejected the target file.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("writing tags to {}: {source}", path.display())]
    Id3 {
        path: PathBuf,
        #[source]
        source: id3::Error,
    },
    #[error("tag task failed: {0}")]
    Task(String),
}

/// Fatal setup failure; nothing has been fetched yet.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot create destination {}: {source}", path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid listing URL {url}: {reason}")]
    ListingUrl { url: String, reason: String },
}
