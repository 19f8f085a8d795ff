//! In-memory doubles for the transport, progress and tag seams.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::episode::TagSet;
use crate::error::TagError;
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, ProgressHandle, ProgressSink, TransferProgress};
use crate::retry::TransferError;
use crate::tagger::TagWriter;

/// `CURLE_PARTIAL_FILE`: the body ended before the announced length.
const CURLE_PARTIAL_FILE: u32 = 18;

/// Serves canned pages and bodies keyed by exact URL. Unknown URLs are 404.
#[derive(Default)]
pub struct FakeClient {
    pages: HashMap<String, String>,
    bodies: HashMap<String, Vec<u8>>,
    broken: HashMap<String, Vec<u8>>,
    failures: Mutex<HashMap<String, u32>>,
    requests: AtomicUsize,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }

    /// Writes `partial` then fails as a truncated transfer.
    pub fn with_broken_body(mut self, url: &str, partial: &[u8]) -> Self {
        self.broken.insert(url.to_string(), partial.to_vec());
        self
    }

    /// The first `n` requests for `url` answer 503.
    pub fn failing_first(self, url: &str, n: u32) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(url.to_string(), n);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn begin(&self, url: &str) -> Result<(), TransferError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(url) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(TransferError::Http(503))
            }
            _ => Ok(()),
        }
    }
}

impl HttpClient for FakeClient {
    fn get_text(&self, url: &str) -> Result<String, TransferError> {
        self.begin(url)?;
        self.pages
            .get(url)
            .cloned()
            .ok_or(TransferError::Http(404))
    }

    fn download(
        &self,
        url: &str,
        out: &mut dyn Write,
        on_progress: &mut dyn FnMut(TransferProgress),
    ) -> Result<u64, TransferError> {
        self.begin(url)?;
        if let Some(partial) = self.broken.get(url) {
            out.write_all(partial).map_err(TransferError::Storage)?;
            on_progress(TransferProgress {
                bytes_done: partial.len() as u64,
                total_bytes: Some(partial.len() as u64 * 2),
            });
            return Err(TransferError::Curl(curl::Error::new(CURLE_PARTIAL_FILE)));
        }
        let body = self.bodies.get(url).ok_or(TransferError::Http(404))?;
        let total = body.len() as u64;
        on_progress(TransferProgress {
            bytes_done: 0,
            total_bytes: Some(total),
        });
        out.write_all(body).map_err(TransferError::Storage)?;
        on_progress(TransferProgress {
            bytes_done: total,
            total_bytes: Some(total),
        });
        Ok(total)
    }
}

/// Records every event per label.
#[derive(Default)]
pub struct RecordingSink {
    events: std::sync::Arc<Mutex<HashMap<String, Vec<ProgressEvent>>>>,
}

impl RecordingSink {
    pub fn events(&self, label: &str) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap()
            .get(label)
            .cloned()
            .unwrap_or_default()
    }

    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.events.lock().unwrap().keys().cloned().collect();
        labels.sort();
        labels
    }
}

struct RecordingHandle {
    label: String,
    events: std::sync::Arc<Mutex<HashMap<String, Vec<ProgressEvent>>>>,
}

impl ProgressHandle for RecordingHandle {
    fn update(&self, event: &ProgressEvent) {
        self.events
            .lock()
            .unwrap()
            .entry(self.label.clone())
            .or_default()
            .push(event.clone());
    }
}

impl ProgressSink for RecordingSink {
    fn start(&self, label: &str) -> Box<dyn ProgressHandle> {
        Box::new(RecordingHandle {
            label: label.to_string(),
            events: std::sync::Arc::clone(&self.events),
        })
    }
}

/// Remembers what it was asked to tag; optionally refuses.
#[derive(Default)]
pub struct RecordingTagger {
    written: Mutex<Vec<(PathBuf, TagSet)>>,
    refuse: bool,
}

impl RecordingTagger {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<(PathBuf, TagSet)> {
        self.written.lock().unwrap().clone()
    }
}

impl TagWriter for RecordingTagger {
    fn write_tags(&self, path: &Path, tags: &TagSet) -> Result<(), TagError> {
        if self.refuse {
            return Err(TagError::Task(format!("refusing {}", path.display())));
        }
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), tags.clone()));
        Ok(())
    }
}
