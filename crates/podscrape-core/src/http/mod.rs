//! HTTP transport.
//!
//! The pipeline only needs two operations: fetch a listing page as text and
//! stream an audio file into a writer. `HttpClient` is that seam;
//! `CurlClient` is the libcurl implementation. Calls block; run them from
//! `spawn_blocking` when used from async code.

mod curl_client;

pub use curl_client::{CurlClient, CurlOptions};

use std::io::Write;

use crate::progress::TransferProgress;
use crate::retry::TransferError;

pub trait HttpClient: Send + Sync {
    /// GET `url` and return the body decoded as UTF-8.
    fn get_text(&self, url: &str) -> Result<String, TransferError>;

    /// GET `url`, writing the body sequentially to `out`. `on_progress` is
    /// called as bytes arrive. Returns the number of bytes written.
    fn download(
        &self,
        url: &str,
        out: &mut dyn Write,
        on_progress: &mut dyn FnMut(TransferProgress),
    ) -> Result<u64, TransferError>;
}
