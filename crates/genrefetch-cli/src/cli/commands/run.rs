//! `genrefetch run` – acquire every genre in the catalog.

use anyhow::{Context, Result};
use genrefetch_core::catalog::Catalog;
use genrefetch_core::config::GenrefetchConfig;
use genrefetch_core::scheduler::{
    AcquireSettings, Acquisition, CollectionStatus, ProgressEvent, RunReport, TermEnd,
};
use std::path::Path;

use super::media_source;

pub async fn run_acquisition(
    cfg: &GenrefetchConfig,
    catalog_path: &Path,
    datasets_dir: &Path,
    settings: AcquireSettings,
    genres: &[String],
    report_path: Option<&Path>,
) -> Result<()> {
    let catalog = Catalog::load(catalog_path)?.select(genres)?;
    if catalog.is_empty() {
        println!("No genres in catalog.");
        return Ok(());
    }

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressEvent>(64);
    let acquisition =
        Acquisition::new(media_source(cfg), datasets_dir, settings).with_progress(progress_tx);

    let token = acquisition.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted: finishing the current batch, then stopping.");
            token.cancel();
        }
    });
    let printer = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            if let Some(line) = describe_event(&event) {
                println!("{}", line);
            }
        }
    });

    let report = acquisition.run(catalog.collections()).await;
    // Dropping the acquisition closes the progress channel.
    drop(acquisition);
    let _ = printer.await;
    ctrl_c.abort();

    print_summary(&report);
    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }
    tracing::info!(
        fetched = report.total_fetched(),
        target = report.total_target(),
        cancelled = report.cancelled,
        "run finished"
    );
    Ok(())
}

pub(crate) fn describe_event(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::CollectionStarted {
            collection,
            target_count,
            quota_per_term,
        } => Some(format!(
            "\nDownloading {} tracks for genre: {} ({} per term)",
            target_count, collection, quota_per_term
        )),
        ProgressEvent::BatchFinished {
            term,
            batch,
            succeeded,
            requested,
            fetched,
            quota,
            ..
        } => Some(format!(
            "  [{}] batch {}: {}/{} ok, {}/{} for term",
            term, batch, succeeded, requested, fetched, quota
        )),
        ProgressEvent::TermFinished { term, end, .. } => match end {
            TermEnd::QuotaMet => None,
            TermEnd::Exhausted => Some(format!("  [{}] no more results", term)),
            TermEnd::SourceUnavailable(e) => Some(format!("  [{}] search failed: {}", term, e)),
            TermEnd::Cancelled => Some(format!("  [{}] cancelled", term)),
            TermEnd::Abandoned(e) => Some(format!("  [{}] abandoned: {}", term, e)),
        },
        ProgressEvent::CollectionFinished {
            collection,
            fetched,
            target_count,
        } => Some(format!("Finished {}: {}/{}", collection, fetched, target_count)),
    }
}

fn print_summary(report: &RunReport) {
    println!();
    println!("{:<20} {:>8} {:>8}  {}", "GENRE", "FETCHED", "TARGET", "STATUS");
    for c in &report.collections {
        let status = match &c.status {
            CollectionStatus::Completed if c.fetched < c.target_count => "under quota".to_string(),
            CollectionStatus::Completed => "complete".to_string(),
            CollectionStatus::Cancelled => "cancelled".to_string(),
            CollectionStatus::Failed(e) => format!("failed: {}", e),
        };
        println!("{:<20} {:>8} {:>8}  {}", c.name, c.fetched, c.target_count, status);
    }
    println!(
        "{:<20} {:>8} {:>8}",
        "TOTAL",
        report.total_fetched(),
        report.total_target()
    );
}
