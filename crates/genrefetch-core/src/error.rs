//! Error taxonomy for the acquisition scheduler.
//!
//! Failures are contained at the smallest scope that can absorb them:
//! candidate → page → term → collection. None of these abort a whole run.

use thiserror::Error;

use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum AcquireError {
    /// Malformed collection: no search terms but a nonzero target.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Search failed (after any configured retries). Treated like an empty page.
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[source] SourceError),

    /// A single candidate could not be retrieved.
    #[error("fetch failed for {id}: {reason}")]
    FetchFailure { id: String, reason: String },

    /// Anything else while processing a term or collection.
    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl AcquireError {
    pub fn unexpected(err: impl std::fmt::Display) -> Self {
        AcquireError::Unexpected(err.to_string())
    }

    /// Maps a failed search: a source that cannot run at all is unexpected,
    /// anything else is an outage.
    pub fn from_search(err: SourceError) -> Self {
        if err.is_unrecoverable() {
            AcquireError::unexpected(err)
        } else {
            AcquireError::SourceUnavailable(err)
        }
    }
}
