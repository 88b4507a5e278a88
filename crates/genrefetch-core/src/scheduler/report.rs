//! Run report: fetched counts per collection and per term.

use std::path::PathBuf;

use serde::Serialize;

/// Why a term stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TermEnd {
    QuotaMet,
    /// The source returned an empty page.
    Exhausted,
    /// Search kept failing; handled like an empty page.
    SourceUnavailable(String),
    /// Cancellation was requested before the term finished.
    Cancelled,
    /// An unexpected error; `fetched` keeps the partial count.
    Abandoned(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct TermReport {
    pub term: String,
    pub quota: u32,
    pub fetched: u32,
    /// Search pages that returned candidates.
    pub pages: u32,
    pub attempted: u32,
    pub failed: u32,
    /// Offset the next search would have used.
    pub next_offset: usize,
    pub end: TermEnd,
    pub artifacts: Vec<PathBuf>,
}

impl TermReport {
    pub fn is_under_quota(&self) -> bool {
        self.fetched < self.quota
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CollectionStatus {
    /// Every term ran to its own end.
    Completed,
    Cancelled,
    /// The collection could not be started (invalid input, directory error).
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub name: String,
    pub target_count: u32,
    pub quota_per_term: u32,
    pub fetched: u32,
    pub terms: Vec<TermReport>,
    pub status: CollectionStatus,
}

impl CollectionReport {
    pub(crate) fn new(name: &str, target_count: u32) -> Self {
        Self {
            name: name.to_string(),
            target_count,
            quota_per_term: 0,
            fetched: 0,
            terms: Vec::new(),
            status: CollectionStatus::Completed,
        }
    }

    pub(crate) fn push_term(&mut self, term: TermReport) {
        self.fetched += term.fetched;
        self.terms.push(term);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub collections: Vec<CollectionReport>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn total_fetched(&self) -> u32 {
        self.collections.iter().map(|c| c.fetched).sum()
    }

    pub fn total_target(&self) -> u32 {
        self.collections.iter().map(|c| c.target_count).sum()
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionReport> {
        self.collections.iter().find(|c| c.name == name)
    }
}
