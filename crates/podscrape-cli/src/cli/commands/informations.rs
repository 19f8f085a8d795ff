//! `--informations`: print what would be downloaded as a playlist.

use anyhow::Result;
use podscrape_core::pipeline::{PageSpec, Pipeline};

pub async fn run_informations(pipeline: &Pipeline, selection: &PageSpec) -> Result<()> {
    let (playlist, summary) = pipeline.extract_informations(selection).await;
    for err in summary.page_errors() {
        tracing::warn!("{}", err);
    }
    print!("{}", playlist);
    Ok(())
}
