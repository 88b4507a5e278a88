//! Acquisition orchestrator: collections in order, terms in order, one page at a time.
//!
//! Concurrency exists only inside a page's fetch dispatch, so the whole run
//! never has more than `max_workers` fetches in flight regardless of catalog size.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::paginate::Paginator;
use super::progress::ProgressEvent;
use super::quota;
use super::report::{CollectionReport, CollectionStatus, RunReport};
use super::settings::AcquireSettings;
use crate::catalog::CollectionSpec;
use crate::error::AcquireError;
use crate::source::MediaSource;

/// Drives a full run over a set of collections and produces a `RunReport`.
pub struct Acquisition {
    source: Arc<dyn MediaSource>,
    datasets_dir: PathBuf,
    settings: AcquireSettings,
    cancel: CancellationToken,
    progress_tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl Acquisition {
    pub fn new(
        source: Arc<dyn MediaSource>,
        datasets_dir: impl Into<PathBuf>,
        settings: AcquireSettings,
    ) -> Self {
        Self {
            source,
            datasets_dir: datasets_dir.into(),
            settings,
            cancel: CancellationToken::new(),
            progress_tx: None,
        }
    }

    /// Use `token` to stop the run. In-flight pages drain before it halts.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<ProgressEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn collection_dir(&self, name: &str) -> PathBuf {
        self.datasets_dir.join(name)
    }

    /// Processes `collections` sequentially. Never fails: problems are
    /// recorded per term or per collection in the report.
    pub async fn run(&self, collections: &[CollectionSpec]) -> RunReport {
        let mut report = RunReport::default();
        for spec in collections {
            let collection = self.run_collection(spec).await;
            tracing::info!(
                collection = %collection.name,
                fetched = collection.fetched,
                target = collection.target_count,
                "collection finished"
            );
            self.emit(ProgressEvent::CollectionFinished {
                collection: collection.name.clone(),
                fetched: collection.fetched,
                target_count: collection.target_count,
            })
            .await;
            report.collections.push(collection);
        }
        report.cancelled = self.cancel.is_cancelled();
        report
    }

    async fn run_collection(&self, spec: &CollectionSpec) -> CollectionReport {
        let mut report = CollectionReport::new(&spec.name, spec.target_count);
        if self.cancel.is_cancelled() {
            report.status = CollectionStatus::Cancelled;
            return report;
        }

        let quota_per_term = match quota::plan(spec.target_count, spec.search_terms.len()) {
            Ok(q) => q,
            Err(e) => {
                tracing::error!(collection = %spec.name, "skipping collection: {}", e);
                report.status = CollectionStatus::Failed(e.to_string());
                return report;
            }
        };
        report.quota_per_term = quota_per_term;

        let dest = self.collection_dir(&spec.name);
        if let Err(e) = ensure_dir(&dest).await {
            tracing::error!(collection = %spec.name, "skipping collection: {}", e);
            report.status = CollectionStatus::Failed(e.to_string());
            return report;
        }

        tracing::info!(
            collection = %spec.name,
            target = spec.target_count,
            terms = spec.search_terms.len(),
            quota_per_term,
            "acquiring collection"
        );
        self.emit(ProgressEvent::CollectionStarted {
            collection: spec.name.clone(),
            target_count: spec.target_count,
            quota_per_term,
        })
        .await;

        let paginator =
            Paginator::new(&self.source, &dest, &self.settings, &self.cancel, &spec.name)
                .with_progress(self.progress_tx.as_ref());
        for term in &spec.search_terms {
            let term_report = paginator.run(term, quota_per_term).await;
            report.push_term(term_report);
        }

        if self.cancel.is_cancelled() {
            report.status = CollectionStatus::Cancelled;
        }
        report
    }

    async fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(event).await;
        }
    }
}

async fn ensure_dir(dir: &Path) -> Result<(), AcquireError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AcquireError::Unexpected(format!("create {}: {}", dir.display(), e)))
}
