//! Single-file episode downloader.
//!
//! Streams one audio file to its final path. A path that already exists is
//! treated as a finished download and left alone; a failed transfer removes
//! whatever it wrote.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::DownloadError;
use crate::http::HttpClient;
use crate::progress::{ProgressCallback, ProgressEvent, ProgressHandle, ProgressSink, TransferProgress};
use crate::retry::{run_with_retry, RetryPolicy, TransferError};

/// What `Downloader::download` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Destination already existed; nothing was fetched.
    Skipped,
    Downloaded { bytes: u64 },
}

#[derive(Clone)]
pub struct Downloader {
    client: Arc<dyn HttpClient>,
    progress: Arc<dyn ProgressSink>,
    retry: RetryPolicy,
}

impl Downloader {
    pub fn new(
        client: Arc<dyn HttpClient>,
        progress: Arc<dyn ProgressSink>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            progress,
            retry,
        }
    }

    /// Downloads `url` to `destination`. The parent directory must exist.
    ///
    /// Progress goes to the sink and, when given, to `on_progress`.
    pub async fn download(
        &self,
        url: &str,
        destination: &Path,
        on_progress: Option<ProgressCallback>,
    ) -> Result<DownloadOutcome, DownloadError> {
        let exists = tokio::fs::try_exists(destination)
            .await
            .map_err(|source| DownloadError::Filesystem {
                path: destination.to_path_buf(),
                source,
            })?;
        if exists {
            tracing::debug!(path = %destination.display(), "already present, skipping");
            return Ok(DownloadOutcome::Skipped);
        }

        let label = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let handle = self.progress.start(&label);
        let client = Arc::clone(&self.client);
        let retry = self.retry;
        let url = url.to_string();
        let destination = destination.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let report = |event: ProgressEvent| {
                handle.update(&event);
                if let Some(cb) = &on_progress {
                    cb(&event);
                }
            };
            download_blocking(client.as_ref(), &url, &destination, &retry, &report)
        })
        .await
        .map_err(|e| DownloadError::Task(e.to_string()))?
    }
}

fn download_blocking(
    client: &dyn HttpClient,
    url: &str,
    destination: &Path,
    retry: &RetryPolicy,
    report: &dyn Fn(ProgressEvent),
) -> Result<DownloadOutcome, DownloadError> {
    let result = run_with_retry(retry, |attempt| {
        if attempt > 1 {
            tracing::info!(attempt, url, "retrying download");
        }
        attempt_once(client, url, destination, report)
    });

    match result {
        Ok(Some(bytes)) => {
            report(ProgressEvent::Done);
            Ok(DownloadOutcome::Downloaded { bytes })
        }
        Ok(None) => {
            tracing::debug!(path = %destination.display(), "created concurrently, skipping");
            report(ProgressEvent::Done);
            Ok(DownloadOutcome::Skipped)
        }
        Err(TransferError::Storage(source)) => Err(DownloadError::Filesystem {
            path: PathBuf::from(destination),
            source,
        }),
        Err(source) => Err(DownloadError::Transport {
            url: url.to_string(),
            source,
        }),
    }
}

/// One transfer into a freshly created file. On failure the file is closed
/// and removed before returning.
///
/// `Ok(None)` means the destination appeared after the existence check (an
/// entry with the same name got there first); it is left untouched.
fn attempt_once(
    client: &dyn HttpClient,
    url: &str,
    destination: &Path,
    report: &dyn Fn(ProgressEvent),
) -> Result<Option<u64>, TransferError> {
    let file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(TransferError::Storage(e)),
    };
    let mut writer = BufWriter::new(file);

    let mut last_percent: Option<u8> = None;
    let mut on_transfer = |p: TransferProgress| {
        if let Some(percent) = p.percent() {
            if last_percent != Some(percent) {
                last_percent = Some(percent);
                report(ProgressEvent::Tick { percent });
            }
        }
    };

    let result = client
        .download(url, &mut writer, &mut on_transfer)
        .and_then(|bytes| {
            writer.flush().map_err(TransferError::Storage)?;
            writer.get_ref().sync_all().map_err(TransferError::Storage)?;
            Ok(bytes)
        });
    drop(writer);

    if let Err(e) = &result {
        report(ProgressEvent::Failed {
            message: e.to_string(),
        });
        if let Err(rm) = std::fs::remove_file(destination) {
            tracing::warn!(path = %destination.display(), "could not remove partial file: {}", rm);
        }
    }
    result.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::test_support::{FakeClient, RecordingSink};
    use std::time::Duration;

    fn downloader(client: Arc<FakeClient>, sink: Arc<dyn ProgressSink>) -> Downloader {
        Downloader::new(client, sink, RetryPolicy::no_retry())
    }

    #[tokio::test]
    async fn writes_body_and_reports_done() {
        let client = Arc::new(FakeClient::new().with_body("http://m/a.mp3", b"audio-bytes"));
        let sink = Arc::new(RecordingSink::default());
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.mp3");

        let outcome = downloader(Arc::clone(&client), sink.clone())
            .download("http://m/a.mp3", &dest, None)
            .await
            .unwrap();

        assert_eq!(outcome, DownloadOutcome::Downloaded { bytes: 11 });
        assert_eq!(std::fs::read(&dest).unwrap(), b"audio-bytes");
        let events = sink.events("a.mp3");
        assert_eq!(events.last(), Some(&ProgressEvent::Done));
        assert!(events.contains(&ProgressEvent::Tick { percent: 100 }));
    }

    #[tokio::test]
    async fn existing_file_is_skipped_without_request() {
        let client = Arc::new(FakeClient::new().with_body("http://m/a.mp3", b"new"));
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.mp3");
        std::fs::write(&dest, b"previous download").unwrap();

        let outcome = downloader(Arc::clone(&client), Arc::new(NoProgress))
            .download("http://m/a.mp3", &dest, None)
            .await
            .unwrap();

        assert_eq!(outcome, DownloadOutcome::Skipped);
        assert_eq!(client.request_count(), 0);
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous download");
    }

    #[tokio::test]
    async fn transport_failure_removes_partial_file() {
        let client = Arc::new(FakeClient::new().with_broken_body("http://m/a.mp3", b"half"));
        let sink = Arc::new(RecordingSink::default());
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.mp3");

        let err = downloader(Arc::clone(&client), sink.clone())
            .download("http://m/a.mp3", &dest, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Transport { .. }), "got {:?}", err);
        assert!(!dest.exists(), "partial file must be removed");
        match sink.events("a.mp3").last() {
            Some(ProgressEvent::Failed { message }) => assert!(!message.is_empty()),
            other => panic!("expected failure event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn http_error_leaves_no_file() {
        let client = Arc::new(FakeClient::new());
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.mp3");

        let err = downloader(client, Arc::new(NoProgress))
            .download("http://m/missing.mp3", &dest, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DownloadError::Transport {
                source: TransferError::Http(404),
                ..
            }
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn retries_start_from_clean_file() {
        let client = Arc::new(
            FakeClient::new()
                .with_body("http://m/a.mp3", b"complete")
                .failing_first("http://m/a.mp3", 2),
        );
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.mp3");
        let retry = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        };

        let outcome = Downloader::new(client.clone(), Arc::new(NoProgress), retry)
            .download("http://m/a.mp3", &dest, None)
            .await
            .unwrap();

        assert_eq!(outcome, DownloadOutcome::Downloaded { bytes: 8 });
        assert_eq!(client.request_count(), 3);
        assert_eq!(std::fs::read(&dest).unwrap(), b"complete");
    }

    #[tokio::test]
    async fn caller_callback_sees_every_event() {
        let client = Arc::new(FakeClient::new().with_body("http://m/a.mp3", b"xyz"));
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.mp3");
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |event: &ProgressEvent| {
            seen_cb.lock().unwrap().push(event.clone());
        });

        downloader(client, Arc::new(NoProgress))
            .download("http://m/a.mp3", &dest, Some(callback))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&ProgressEvent::Done));
        assert!(seen.len() >= 2);
    }

    #[test]
    fn file_created_after_existence_check_is_skipped() {
        let client = FakeClient::new().with_body("http://m/a.mp3", b"second");
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.mp3");
        std::fs::write(&dest, b"first").unwrap();

        let outcome = download_blocking(
            &client,
            "http://m/a.mp3",
            &dest,
            &RetryPolicy::no_retry(),
            &|_| {},
        )
        .unwrap();

        assert_eq!(outcome, DownloadOutcome::Skipped);
        assert_eq!(client.request_count(), 0);
        assert_eq!(std::fs::read(&dest).unwrap(), b"first");
    }
}
