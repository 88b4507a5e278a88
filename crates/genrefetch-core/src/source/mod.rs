//! Media source capability consumed by the scheduler.
//!
//! The scheduler only ever talks to a `MediaSource`: a paged `search` and a
//! per-candidate `fetch`. `YtDlpSource` is the bundled implementation.

mod error;
mod ytdlp;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::SourceError;
pub use ytdlp::{parse_search_output, YtDlpSource};

/// A discovered, not-yet-fetched item returned by a search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    /// Opaque locator handed back to `fetch` (typically a URL).
    pub reference: String,
    pub duration_secs: u64,
}

/// Result of one fetch attempt. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutcome {
    pub success: bool,
    pub artifact_path: Option<PathBuf>,
}

impl FetchOutcome {
    pub fn fetched(path: PathBuf) -> Self {
        Self {
            success: true,
            artifact_path: Some(path),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            artifact_path: None,
        }
    }
}

/// Search and fetch capability of an external content source.
///
/// Implementations must write each candidate to a distinct path inside
/// `dest` (derived from the candidate, see [`crate::naming`]); the
/// dispatcher runs several fetches into the same directory at once.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Returns up to `limit` candidates for `query`, skipping the first
    /// `offset` results. An empty vector means the query is exhausted.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Candidate>, SourceError>;

    /// Retrieves `candidate` into `dest`, returning the artifact path.
    async fn fetch(&self, candidate: &Candidate, dest: &Path) -> Result<PathBuf, SourceError>;
}
