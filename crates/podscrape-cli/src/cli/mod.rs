//! CLI for the podscrape podcast scraper.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use podscrape_core::config::{self, PodscrapeConfig};
use podscrape_core::http::{CurlClient, CurlOptions};
use podscrape_core::pipeline::{PageSpec, Pipeline, PipelineOptions};
use podscrape_core::progress::{BarProgress, NoProgress, ProgressSink};
use podscrape_core::tagger::Id3TagWriter;
use std::path::PathBuf;
use std::sync::Arc;

use commands::{run_download, run_informations};

/// Download the episodes listed on a podcast page, tagged and named by date.
#[derive(Debug, Parser)]
#[command(name = "podscrape", version)]
#[command(about = "Scrape a radio show listing and download its episodes", long_about = None)]
pub struct Cli {
    /// Listing pages to scrape, comma separated (default: 1).
    #[arg(
        long,
        value_name = "N,N,...",
        value_delimiter = ',',
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub pages: Vec<u32>,

    /// Directory receiving the audio files (default from config, `./dest`).
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Print a playlist of the episodes instead of downloading them.
    #[arg(long)]
    pub informations: bool,

    /// Listing page URL (overrides `listing_url` in the config file).
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        cli.run(cfg).await
    }

    /// Config with the command-line overrides applied.
    pub fn apply(&self, mut cfg: PodscrapeConfig) -> PodscrapeConfig {
        if let Some(dest) = &self.dest {
            cfg.destination = dest.clone();
        }
        if let Some(url) = &self.url {
            cfg.listing_url = url.clone();
        }
        cfg
    }

    pub fn page_spec(&self) -> PageSpec {
        PageSpec::from(self.pages.clone())
    }

    async fn run(self, cfg: PodscrapeConfig) -> Result<()> {
        let cfg = self.apply(cfg);
        let progress: Arc<dyn ProgressSink> = if self.informations {
            Arc::new(NoProgress)
        } else {
            Arc::new(BarProgress::new())
        };
        let pipeline = Pipeline::setup(
            PipelineOptions::from_config(&cfg),
            Arc::new(CurlClient::new(CurlOptions::from(&cfg))),
            progress,
            Arc::new(Id3TagWriter),
        )
        .await
        .context("pipeline setup")?;

        let selection = self.page_spec();
        if self.informations {
            run_informations(&pipeline, &selection).await
        } else {
            run_download(&pipeline, &selection).await
        }
    }
}

#[cfg(test)]
mod tests;
