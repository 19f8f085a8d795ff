//! Scrape-and-download orchestration.
//!
//! Every requested listing page is fetched and extracted in its own task; every
//! episode found runs the per-entry action in its own task. A page that cannot
//! be fetched or parsed is logged and reported with zero entries, and neither
//! it nor a failed episode stops the others.

mod pages;
mod playlist;
mod summary;

pub use pages::PageSpec;
pub use playlist::{Playlist, PlaylistEntry};
pub use summary::{EntryOutcome, PageReport, RunSummary};

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

use crate::config::PodscrapeConfig;
use crate::downloader::{DownloadOutcome, Downloader};
use crate::episode::{DownloadContext, NamingOptions, RawEpisodeRecord, TagSet};
use crate::error::{DownloadError, PageError, PipelineError, TagError};
use crate::extract::PageExtractor;
use crate::http::HttpClient;
use crate::progress::ProgressSink;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::tagger::TagWriter;
use crate::url_model;

/// Run parameters, usually taken from `PodscrapeConfig`.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub listing_url: String,
    pub destination: PathBuf,
    pub retry: RetryPolicy,
    pub naming: NamingOptions,
    pub copyright: Option<String>,
    /// Cap on concurrently running entry actions (None = unbounded).
    pub max_concurrent: Option<usize>,
}

impl PipelineOptions {
    pub fn from_config(cfg: &PodscrapeConfig) -> Self {
        Self {
            listing_url: cfg.listing_url.clone(),
            destination: cfg.destination.clone(),
            retry: RetryPolicy::from_config(cfg.retry.as_ref()),
            naming: NamingOptions {
                collision: cfg.name_collision,
            },
            copyright: cfg.copyright_tag().map(str::to_string),
            max_concurrent: cfg.max_concurrent_downloads,
        }
    }
}

struct Inner {
    listing_url: Url,
    extractor: PageExtractor,
    destination: PathBuf,
    client: Arc<dyn HttpClient>,
    downloader: Downloader,
    tagger: Arc<dyn TagWriter>,
    retry: RetryPolicy,
    naming: NamingOptions,
    copyright: Option<String>,
    limit: Option<Arc<Semaphore>>,
}

/// A configured run against one listing. Cheap to clone.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<Inner>,
}

impl Pipeline {
    /// Validates the listing URL and creates the destination directory.
    pub async fn setup(
        options: PipelineOptions,
        client: Arc<dyn HttpClient>,
        progress: Arc<dyn ProgressSink>,
        tagger: Arc<dyn TagWriter>,
    ) -> Result<Self, PipelineError> {
        let invalid = |reason: String| PipelineError::ListingUrl {
            url: options.listing_url.clone(),
            reason,
        };
        let listing_url = Url::parse(&options.listing_url).map_err(|e| invalid(e.to_string()))?;
        let extractor = PageExtractor::new(&listing_url).map_err(|e| invalid(e.to_string()))?;

        tokio::fs::create_dir_all(&options.destination)
            .await
            .map_err(|source| PipelineError::Destination {
                path: options.destination.clone(),
                source,
            })?;

        let downloader = Downloader::new(Arc::clone(&client), progress, options.retry);
        let limit = options
            .max_concurrent
            .map(|n| Arc::new(Semaphore::new(n.max(1))));

        Ok(Self {
            inner: Arc::new(Inner {
                listing_url,
                extractor,
                destination: options.destination,
                client,
                downloader,
                tagger,
                retry: options.retry,
                naming: options.naming,
                copyright: options.copyright,
                limit,
            }),
        })
    }

    pub fn listing_url(&self) -> &Url {
        &self.inner.listing_url
    }

    pub fn destination(&self) -> &Path {
        &self.inner.destination
    }

    /// Fetches listing page `page` and extracts its playable episodes.
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<RawEpisodeRecord>, PageError> {
        let url = url_model::page_url(&self.inner.listing_url, page);
        tracing::debug!(page, url = %url, "fetching listing page");

        let client = Arc::clone(&self.inner.client);
        let retry = self.inner.retry;
        let html = tokio::task::spawn_blocking(move || {
            run_with_retry(&retry, |_| client.get_text(url.as_str()))
        })
        .await
        .map_err(|e| PageError::Task {
            page,
            reason: e.to_string(),
        })?
        .map_err(|source| PageError::Transport { page, source })?;

        self.inner
            .extractor
            .extract(&html)
            .map_err(|source| PageError::Parse { page, source })
    }

    /// Runs `action` on every episode of every page in `selection`, all pages and
    /// entries concurrently, and waits for everything to finish.
    pub async fn download_action<F, Fut>(&self, selection: &PageSpec, action: F) -> RunSummary
    where
        F: Fn(RawEpisodeRecord) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<EntryOutcome, DownloadError>> + Send + 'static,
    {
        let action = Arc::new(action);
        let mut join_set = JoinSet::new();
        for page in selection.pages() {
            let pipeline = self.clone();
            let action = Arc::clone(&action);
            join_set.spawn(async move { pipeline.run_page(page, action).await });
        }

        let mut summary = RunSummary::default();
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok(report) => summary.push(report),
                Err(e) => {
                    tracing::warn!("page task join: {}", e);
                    summary.lost_tasks += 1;
                }
            }
        }

        tracing::info!(
            pages = summary.pages.len(),
            entries = summary.entries(),
            downloaded = summary.downloaded(),
            skipped = summary.skipped(),
            listed = summary.listed(),
            failed = summary.failed(),
            "run finished"
        );
        summary
    }

    async fn run_page<F, Fut>(&self, page: u32, action: Arc<F>) -> PageReport
    where
        F: Fn(RawEpisodeRecord) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<EntryOutcome, DownloadError>> + Send + 'static,
    {
        let records = match self.fetch_page(page).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(page, "page skipped: {}", e);
                return PageReport::failed_page(e);
            }
        };
        tracing::debug!(page, entries = records.len(), "page extracted");

        let mut report = PageReport::new(page);
        report.entries = records.len();

        let mut join_set = JoinSet::new();
        for record in records {
            let action = Arc::clone(&action);
            let limit = self.inner.limit.clone();
            join_set.spawn(async move {
                let _permit = match limit {
                    Some(sem) => Some(
                        sem.acquire_owned()
                            .await
                            .map_err(|e| DownloadError::Task(e.to_string()))?,
                    ),
                    None => None,
                };
                (*action)(record).await
            });
        }

        while let Some(res) = join_set.join_next().await {
            let outcome = res.unwrap_or_else(|e| Err(DownloadError::Task(e.to_string())));
            if let Err(e) = &outcome {
                tracing::warn!(page, "episode failed: {}", e);
            }
            report.record(&outcome);
        }
        report
    }

    /// Downloads every episode of `selection` into the destination, tagging each
    /// file that was actually fetched.
    pub async fn download_pages(&self, selection: &PageSpec) -> RunSummary {
        let pipeline = self.clone();
        self.download_action(selection, move |record| {
            let pipeline = pipeline.clone();
            async move { pipeline.download_episode(record).await }
        })
        .await
    }

    /// Resolves, downloads and tags one episode. Already present files are
    /// neither fetched nor re-tagged.
    pub async fn download_episode(
        &self,
        record: RawEpisodeRecord,
    ) -> Result<EntryOutcome, DownloadError> {
        let context = DownloadContext::resolve(record, &self.inner.naming);
        let path = self.inner.destination.join(context.file_name());

        match self.inner.downloader.download(context.url(), &path, None).await? {
            DownloadOutcome::Skipped => {
                tracing::debug!(file = context.file_name(), "already downloaded");
                Ok(EntryOutcome::Skipped)
            }
            DownloadOutcome::Downloaded { bytes } => {
                tracing::info!(file = context.file_name(), bytes, "downloaded");
                let tagged = match self.write_tags(&path, &context).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("{}", e);
                        false
                    }
                };
                Ok(EntryOutcome::Downloaded { tagged })
            }
        }
    }

    async fn write_tags(&self, path: &Path, context: &DownloadContext) -> Result<(), TagError> {
        let tags = TagSet::from_record(context.extra(), self.inner.copyright.as_deref());
        let tagger = Arc::clone(&self.inner.tagger);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || tagger.write_tags(&path, &tags))
            .await
            .map_err(|e| TagError::Task(e.to_string()))?
    }

    /// Lists what `download_pages` would fetch, without downloading. Entries
    /// are in completion order.
    pub async fn extract_informations(&self, selection: &PageSpec) -> (Playlist, RunSummary) {
        let collector = Arc::new(tokio::sync::Mutex::new(Playlist::default()));
        let naming = self.inner.naming;
        let sink = Arc::clone(&collector);
        let summary = self
            .download_action(selection, move |record| {
                let sink = Arc::clone(&sink);
                async move {
                    let context = DownloadContext::resolve(record, &naming);
                    sink.lock().await.push(context.url(), context.name());
                    Ok::<_, DownloadError>(EntryOutcome::Listed)
                }
            })
            .await;

        let playlist = match Arc::try_unwrap(collector) {
            Ok(m) => m.into_inner(),
            Err(arc) => arc.lock().await.clone(),
        };
        (playlist, summary)
    }
}
