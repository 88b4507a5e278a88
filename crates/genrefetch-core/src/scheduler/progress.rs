//! Progress events emitted during a run.
//!
//! Sent over an optional `mpsc` channel so the CLI can print as it goes.
//! Counts carried here are the same numbers that end up in the `RunReport`.

use super::report::TermEnd;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    CollectionStarted {
        collection: String,
        target_count: u32,
        quota_per_term: u32,
    },
    /// One page searched and fully fetched.
    BatchFinished {
        collection: String,
        term: String,
        /// 1-based page index within the term.
        batch: u32,
        requested: usize,
        succeeded: u32,
        fetched: u32,
        quota: u32,
    },
    TermFinished {
        collection: String,
        term: String,
        fetched: u32,
        quota: u32,
        end: TermEnd,
    },
    CollectionFinished {
        collection: String,
        fetched: u32,
        target_count: u32,
    },
}
