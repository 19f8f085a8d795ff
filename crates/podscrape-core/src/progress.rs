//! Progress reporting for episode downloads.
//!
//! The downloader turns raw byte counts (`TransferProgress`) into
//! `(percent, status)` events and hands them to a `ProgressSink`; the CLI uses
//! `BarProgress` (one indicatif bar per file), tests use `NoProgress` or their
//! own sink.

use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Raw byte counts reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes received so far.
    pub bytes_done: u64,
    /// Total size in bytes, when the server announced it.
    pub total_bytes: Option<u64>,
}

impl TransferProgress {
    /// Fraction complete in [0.0, 1.0] (None if the total is unknown).
    pub fn fraction(&self) -> Option<f64> {
        let total = self.total_bytes?;
        if total == 0 {
            return Some(1.0);
        }
        Some((self.bytes_done as f64 / total as f64).min(1.0))
    }

    /// Whole percent complete, 0..=100.
    pub fn percent(&self) -> Option<u8> {
        self.fraction().map(|f| (f * 100.0).floor() as u8)
    }
}

/// One `(percent, status)` update for a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Tick { percent: u8 },
    Done,
    Failed { message: String },
}

impl ProgressEvent {
    pub fn percent(&self) -> u8 {
        match self {
            ProgressEvent::Tick { percent } => *percent,
            ProgressEvent::Done => 100,
            ProgressEvent::Failed { .. } => 0,
        }
    }

    pub fn status(&self) -> &str {
        match self {
            ProgressEvent::Tick { .. } => "",
            ProgressEvent::Done => "done",
            ProgressEvent::Failed { message } => message,
        }
    }
}

/// Caller-supplied observer, called after the sink for every event.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Receives the events of one download.
pub trait ProgressHandle: Send + Sync {
    fn update(&self, event: &ProgressEvent);
}

/// Creates one handle per download, labelled with the file name.
pub trait ProgressSink: Send + Sync {
    fn start(&self, label: &str) -> Box<dyn ProgressHandle>;
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressHandle for NoProgress {
    fn update(&self, _event: &ProgressEvent) {}
}

impl ProgressSink for NoProgress {
    fn start(&self, _label: &str) -> Box<dyn ProgressHandle> {
        Box::new(NoProgress)
    }
}

/// Terminal progress bars, one line per download.
#[derive(Clone)]
pub struct BarProgress {
    multi: MultiProgress,
    style: ProgressStyle,
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl BarProgress {
    /// Bars drawn on stderr.
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Bars that are tracked but never drawn.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let style = ProgressStyle::with_template("[{bar:60}] {pos:>3}% {prefix} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        Self {
            multi: MultiProgress::with_draw_target(target),
            style,
        }
    }
}

impl ProgressSink for BarProgress {
    fn start(&self, label: &str) -> Box<dyn ProgressHandle> {
        let bar = self.multi.add(ProgressBar::new(100));
        bar.set_style(self.style.clone());
        bar.set_prefix(label.to_string());
        Box::new(BarHandle(bar))
    }
}

struct BarHandle(ProgressBar);

impl ProgressHandle for BarHandle {
    fn update(&self, event: &ProgressEvent) {
        self.0.set_position(u64::from(event.percent()));
        match event {
            ProgressEvent::Tick { .. } => {}
            ProgressEvent::Done => self.0.finish_with_message(event.status().to_string()),
            ProgressEvent::Failed { .. } => self.0.abandon_with_message(event.status().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_from_bytes() {
        let p = TransferProgress {
            bytes_done: 250,
            total_bytes: Some(1000),
        };
        assert_eq!(p.percent(), Some(25));
        let unknown = TransferProgress {
            bytes_done: 250,
            total_bytes: None,
        };
        assert_eq!(unknown.percent(), None);
    }

    #[test]
    fn percent_is_capped() {
        let p = TransferProgress {
            bytes_done: 2000,
            total_bytes: Some(1000),
        };
        assert_eq!(p.percent(), Some(100));
        let empty = TransferProgress {
            bytes_done: 0,
            total_bytes: Some(0),
        };
        assert_eq!(empty.fraction(), Some(1.0));
    }

    #[test]
    fn event_percent_and_status() {
        assert_eq!(ProgressEvent::Tick { percent: 42 }.percent(), 42);
        assert_eq!(ProgressEvent::Tick { percent: 42 }.status(), "");
        assert_eq!(ProgressEvent::Done.percent(), 100);
        assert_eq!(ProgressEvent::Done.status(), "done");
        let failed = ProgressEvent::Failed {
            message: "connection reset".into(),
        };
        assert_eq!(failed.percent(), 0);
        assert_eq!(failed.status(), "connection reset");
    }

    #[test]
    fn hidden_bars_accept_events() {
        let sink = BarProgress::hidden();
        let handle = sink.start("2023-11-14-Episode.mp3");
        handle.update(&ProgressEvent::Tick { percent: 10 });
        handle.update(&ProgressEvent::Done);
    }
}
