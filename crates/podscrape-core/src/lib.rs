pub mod config;
pub mod logging;

pub mod downloader;
pub mod episode;
pub mod error;
pub mod extract;
pub mod http;
pub mod pipeline;
pub mod progress;
pub mod retry;
pub mod tagger;
pub mod url_model;

#[cfg(test)]
pub(crate) mod test_support;
