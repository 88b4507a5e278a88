//! In-memory media source for integration tests.
//!
//! Each query maps to a fixed list of result ids; searches slice it by
//! limit/offset and every call is recorded. Fetches write a small file into
//! the destination unless the id is marked as failing.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use genrefetch_core::naming;
use genrefetch_core::source::{Candidate, MediaSource, SourceError};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub query: String,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Default)]
pub struct ScriptedSource {
    results: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    /// Queries whose search returns an error; value is how many calls fail before succeeding.
    flaky: Mutex<HashMap<String, usize>>,
    broken: HashSet<String>,
    panicking: HashSet<String>,
    stalled: HashMap<String, Duration>,
    fetch_delay: Duration,
    cancel_on_fetch: Option<CancellationToken>,
    pub searches: Mutex<Vec<SearchCall>>,
    pub fetches: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// `query` yields ids `<prefix>-0 .. <prefix>-<n-1>`.
    pub fn with_results(mut self, query: &str, n: usize) -> Self {
        let ids = (0..n).map(|i| format!("{}-{}", query.replace(' ', "_"), i)).collect();
        self.results.insert(query.to_string(), ids);
        self
    }

    pub fn failing(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.failing.extend(ids);
        self
    }

    /// The first `failures` searches for `query` fail with a transient error.
    pub fn flaky(self, query: &str, failures: usize) -> Self {
        self.flaky.lock().unwrap().insert(query.to_string(), failures);
        self
    }

    /// Every search for `query` fails as if the source program were missing.
    pub fn broken(mut self, query: &str) -> Self {
        self.broken.insert(query.to_string());
        self
    }

    /// Every search for `query` panics.
    pub fn panicking(mut self, query: &str) -> Self {
        self.panicking.insert(query.to_string());
        self
    }

    /// Searches for `query` sleep for `delay` before answering.
    pub fn stalled(mut self, query: &str, delay: Duration) -> Self {
        self.stalled.insert(query.to_string(), delay);
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    /// Cancels `token` as soon as any fetch starts.
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_fetch = Some(token);
        self
    }

    pub fn searches_for(&self, query: &str) -> Vec<SearchCall> {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.query == query)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MediaSource for ScriptedSource {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Candidate>, SourceError> {
        self.searches.lock().unwrap().push(SearchCall {
            query: query.to_string(),
            limit,
            offset,
        });
        if self.panicking.contains(query) {
            panic!("scripted search panic for {query}");
        }
        if let Some(delay) = self.stalled.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.broken.contains(query) {
            return Err(SourceError::Spawn {
                program: "scripted".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some(left) = flaky.get_mut(query) {
                if *left > 0 {
                    *left -= 1;
                    return Err(SourceError::Unavailable("scripted outage".into()));
                }
            }
        }
        let ids = self.results.get(query).cloned().unwrap_or_default();
        Ok(ids
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|id| Candidate {
                title: format!("Track {}", id),
                reference: format!("scripted://{}", id),
                duration_secs: 180,
                id,
            })
            .collect())
    }

    async fn fetch(&self, candidate: &Candidate, dest: &Path) -> Result<PathBuf, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_fetch {
            token.cancel();
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&candidate.id) {
            return Err(SourceError::Rejected(format!("{} is private", candidate.id)));
        }
        let path = naming::artifact_path(dest, &candidate.title, &candidate.id, "mp3");
        tokio::fs::write(&path, candidate.id.as_bytes()).await?;
        Ok(path)
    }
}
