//! Default mode: download every episode of the selected pages.

use anyhow::{bail, Result};
use podscrape_core::pipeline::{PageSpec, Pipeline};

pub async fn run_download(pipeline: &Pipeline, selection: &PageSpec) -> Result<()> {
    tracing::info!(
        url = %pipeline.listing_url(),
        dest = %pipeline.destination().display(),
        pages = ?selection.pages(),
        "downloading"
    );
    let summary = pipeline.download_pages(selection).await;

    for report in &summary.pages {
        match &report.error {
            Some(err) => println!("page {}: failed ({})", report.page, err),
            None => println!(
                "page {}: {} episode(s), {} downloaded, {} already present, {} failed",
                report.page, report.entries, report.downloaded, report.skipped, report.failed
            ),
        }
    }

    let pages_failed = summary.page_errors().count();
    if summary.entries() == 0 && pages_failed > 0 {
        bail!("no listing page could be read");
    }
    Ok(())
}
