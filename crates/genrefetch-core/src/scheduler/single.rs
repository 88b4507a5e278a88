//! One-off acquisition: a single search and one dispatched page.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::dispatch::dispatch_page;
use super::paginate::search_guarded;
use super::settings::AcquireSettings;
use crate::error::AcquireError;
use crate::retry::run_with_retry;
use crate::source::MediaSource;

/// Searches `query` once and fetches up to `limit` results into `dest`.
/// Returns the paths of the artifacts that were fetched.
pub async fn search_and_fetch(
    source: &Arc<dyn MediaSource>,
    query: &str,
    limit: usize,
    dest: &Path,
    settings: &AcquireSettings,
) -> Result<Vec<PathBuf>, AcquireError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let mut candidates = run_with_retry(&settings.search_retry, || {
        search_guarded(source, query, limit, 0, settings.search_timeout)
    })
    .await
    .map_err(AcquireError::from_search)?;
    if candidates.is_empty() {
        tracing::info!(query, "no results");
        return Ok(Vec::new());
    }
    candidates.truncate(limit);

    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|e| AcquireError::Unexpected(format!("create {}: {}", dest.display(), e)))?;
    let report = dispatch_page(
        source,
        candidates,
        dest,
        settings.max_workers,
        settings.fetch_timeout,
    )
    .await;
    Ok(report.artifacts().cloned().collect())
}
