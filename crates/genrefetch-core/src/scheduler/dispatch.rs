//! Bounded-concurrency fetch of one page of candidates.
//!
//! Each page gets its own worker pool: at most `max_workers` fetches run at
//! once, every fetch is its own tokio task (a panic or error in one never
//! touches its siblings), and the call returns only once the whole page has
//! drained.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::AcquireError;
use crate::source::{Candidate, FetchOutcome, MediaSource};

/// Per-candidate outcomes of one page, in page order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageReport {
    pub outcomes: Vec<(Candidate, FetchOutcome)>,
}

impl PageReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &PathBuf> + '_ {
        self.outcomes
            .iter()
            .filter_map(|(_, o)| o.artifact_path.as_ref())
    }
}

/// Fetches `candidates` into `dest` with at most `max_workers` in flight.
///
/// Errors, timeouts and panics all become `FetchOutcome::failed()` for the
/// candidate concerned.
pub async fn dispatch_page(
    source: &Arc<dyn MediaSource>,
    candidates: Vec<Candidate>,
    dest: &Path,
    max_workers: usize,
    fetch_timeout: Duration,
) -> PageReport {
    if candidates.is_empty() {
        return PageReport::default();
    }
    let workers = max_workers.max(1).min(candidates.len());

    let mut results: Vec<(usize, Candidate, FetchOutcome)> =
        stream::iter(candidates.into_iter().enumerate())
            .map(|(index, candidate)| {
                let source = Arc::clone(source);
                let dest = dest.to_path_buf();
                async move {
                    // One task per fetch; a panic surfaces as a JoinError.
                    let task_candidate = candidate.clone();
                    let handle = tokio::spawn(async move {
                        fetch_one(source.as_ref(), &task_candidate, &dest, fetch_timeout).await
                    });
                    let outcome = match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            tracing::error!(id = %candidate.id, "fetch task failed: {}", e);
                            FetchOutcome::failed()
                        }
                    };
                    (index, candidate, outcome)
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

    results.sort_by_key(|(index, _, _)| *index);
    PageReport {
        outcomes: results.into_iter().map(|(_, c, o)| (c, o)).collect(),
    }
}

async fn fetch_one(
    source: &dyn MediaSource,
    candidate: &Candidate,
    dest: &Path,
    fetch_timeout: Duration,
) -> FetchOutcome {
    let reason = match tokio::time::timeout(fetch_timeout, source.fetch(candidate, dest)).await {
        Ok(Ok(path)) => {
            tracing::debug!(id = %candidate.id, path = %path.display(), "fetched");
            return FetchOutcome::fetched(path);
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timed out after {:?}", fetch_timeout),
    };
    let err = AcquireError::FetchFailure {
        id: candidate.id.clone(),
        reason,
    };
    tracing::warn!(title = %candidate.title, "{}", err);
    FetchOutcome::failed()
}
