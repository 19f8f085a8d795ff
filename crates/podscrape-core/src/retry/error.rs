//! Transfer error type for retry classification.

use thiserror::Error;

/// Error returned by a single HTTP transfer (page fetch or audio stream).
/// Kept separate from the higher-level errors so retries can be decided first.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the received body failed (disk full, permission denied). Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
    /// Page body could not be decoded as UTF-8.
    #[error("response body is not valid UTF-8")]
    Encoding,
}
