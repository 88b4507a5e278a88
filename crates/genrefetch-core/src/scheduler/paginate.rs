//! Paged search for a single term until its quota is met or the source runs dry.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::dispatch::{dispatch_page, PageReport};
use super::progress::ProgressEvent;
use super::report::{TermEnd, TermReport};
use super::settings::AcquireSettings;
use crate::error::AcquireError;
use crate::retry::run_with_retry;
use crate::source::{Candidate, MediaSource, SourceError};

/// Mutable position within one term. Lives only while that term runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermProgress {
    pub term: String,
    pub quota: u32,
    pub fetched: u32,
    pub next_offset: usize,
}

impl TermProgress {
    pub fn new(term: &str, quota: u32) -> Self {
        Self {
            term: term.to_string(),
            quota,
            fetched: 0,
            next_offset: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.fetched >= self.quota
    }

    /// Size of the next search request: `min(page_size, remaining)`.
    pub fn next_request(&self, page_size: usize) -> usize {
        let remaining = self.quota.saturating_sub(self.fetched) as usize;
        page_size.max(1).min(remaining)
    }

    /// Records a fully processed page. The offset moves by what was
    /// requested, whatever the fetch outcome.
    pub fn record_page(&mut self, requested: usize, succeeded: u32) {
        self.fetched = self.fetched.saturating_add(succeeded).min(self.quota);
        self.next_offset += requested;
    }
}

/// Runs terms of one collection against a media source.
pub struct Paginator<'a> {
    source: &'a Arc<dyn MediaSource>,
    dest: &'a Path,
    settings: &'a AcquireSettings,
    cancel: &'a CancellationToken,
    progress_tx: Option<&'a mpsc::Sender<ProgressEvent>>,
    collection: &'a str,
}

impl<'a> Paginator<'a> {
    pub fn new(
        source: &'a Arc<dyn MediaSource>,
        dest: &'a Path,
        settings: &'a AcquireSettings,
        cancel: &'a CancellationToken,
        collection: &'a str,
    ) -> Self {
        Self {
            source,
            dest,
            settings,
            cancel,
            progress_tx: None,
            collection,
        }
    }

    pub fn with_progress(mut self, tx: Option<&'a mpsc::Sender<ProgressEvent>>) -> Self {
        self.progress_tx = tx;
        self
    }

    /// Fetches up to `quota` items for `term`.
    ///
    /// Stops on the first empty page; a page whose fetches all fail does not
    /// stop it. Cancellation is checked between pages, never mid-page.
    pub async fn run(&self, term: &str, quota: u32) -> TermReport {
        let mut progress = TermProgress::new(term, quota);
        let mut report = TermReport {
            term: term.to_string(),
            quota,
            fetched: 0,
            pages: 0,
            attempted: 0,
            failed: 0,
            next_offset: 0,
            end: TermEnd::QuotaMet,
            artifacts: Vec::new(),
        };

        let end = loop {
            if progress.is_done() {
                break TermEnd::QuotaMet;
            }
            if self.cancel.is_cancelled() {
                break TermEnd::Cancelled;
            }

            let requested = progress.next_request(self.settings.page_size);
            let offset = progress.next_offset;
            let mut page = match self.search_page(term, requested, offset).await {
                Ok(page) => page,
                Err(AcquireError::SourceUnavailable(e)) => {
                    tracing::warn!(
                        collection = self.collection,
                        term,
                        offset,
                        "search failed, ending term: {}",
                        e
                    );
                    break TermEnd::SourceUnavailable(e.to_string());
                }
                Err(e) => {
                    tracing::error!(
                        collection = self.collection,
                        term,
                        offset,
                        "abandoning term: {}",
                        e
                    );
                    break TermEnd::Abandoned(e.to_string());
                }
            };
            if page.is_empty() {
                tracing::info!(collection = self.collection, term, offset, "no more results");
                break TermEnd::Exhausted;
            }
            page.truncate(requested);

            let batch = report.pages + 1;
            tracing::info!(
                collection = self.collection,
                term,
                batch,
                offset,
                requested,
                "fetching batch"
            );
            let page_report = dispatch_page(
                self.source,
                page,
                self.dest,
                self.settings.max_workers,
                self.settings.fetch_timeout,
            )
            .await;
            let succeeded = page_report.success_count() as u32;
            progress.record_page(requested, succeeded);
            absorb_page(&mut report, &page_report);
            report.pages = batch;

            tracing::info!(
                collection = self.collection,
                term,
                batch,
                fetched = progress.fetched,
                quota,
                "fetched {}/{} for term",
                progress.fetched,
                quota
            );
            self.emit(ProgressEvent::BatchFinished {
                collection: self.collection.to_string(),
                term: term.to_string(),
                batch,
                requested,
                succeeded,
                fetched: progress.fetched,
                quota,
            })
            .await;
        };

        report.fetched = progress.fetched;
        report.next_offset = progress.next_offset;
        report.end = end;
        self.emit(ProgressEvent::TermFinished {
            collection: self.collection.to_string(),
            term: term.to_string(),
            fetched: report.fetched,
            quota,
            end: report.end.clone(),
        })
        .await;
        report
    }

    async fn search_page(
        &self,
        term: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Candidate>, AcquireError> {
        run_with_retry(&self.settings.search_retry, || {
            search_guarded(self.source, term, limit, offset, self.settings.search_timeout)
        })
        .await
        .map_err(AcquireError::from_search)
    }

    async fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = self.progress_tx {
            let _ = tx.send(event).await;
        }
    }
}

/// One search call on its own task, bounded by `deadline`. A panic in the
/// source comes back as `SourceError::Crashed`.
pub(crate) async fn search_guarded(
    source: &Arc<dyn MediaSource>,
    query: &str,
    limit: usize,
    offset: usize,
    deadline: Duration,
) -> Result<Vec<Candidate>, SourceError> {
    let source = Arc::clone(source);
    let query = query.to_string();
    let handle = tokio::spawn(async move {
        tokio::time::timeout(deadline, source.search(&query, limit, offset)).await
    });
    match handle.await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(SourceError::Timeout(deadline)),
        Err(e) => Err(SourceError::Crashed(e.to_string())),
    }
}

fn absorb_page(report: &mut TermReport, page: &PageReport) {
    report.attempted += page.outcomes.len() as u32;
    report.failed += page.failure_count() as u32;
    report.artifacts.extend(page.artifacts().cloned());
}
