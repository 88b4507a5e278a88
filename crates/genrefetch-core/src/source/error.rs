//! Media source error type.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Error returned by a media source search or fetch.
/// Kept separate from `AcquireError` so retries can be classified first.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source program could not be started (e.g. not installed).
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The source program exited unsuccessfully.
    #[error("exited with {}: {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "signal".into()), .stderr.trim())]
    Exit { code: Option<i32>, stderr: String },
    /// Output could not be decoded.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    /// The call did not finish within its deadline.
    #[error("timed out after {:?}", .0)]
    Timeout(Duration),
    /// The source implementation panicked.
    #[error("source crashed: {0}")]
    Crashed(String),
    /// The fetch reported success but the artifact is not on disk.
    #[error("artifact missing after fetch: {}", .0.display())]
    MissingArtifact(PathBuf),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// Transient unavailability reported by the source itself.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The source refused the candidate (private, removed, region-locked...).
    #[error("rejected: {0}")]
    Rejected(String),
}

impl SourceError {
    /// True when retrying or continuing with the same source cannot help,
    /// e.g. the source executable is missing or not runnable.
    pub fn is_unrecoverable(&self) -> bool {
        match self {
            SourceError::Spawn { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ),
            SourceError::Crashed(_) => true,
            _ => false,
        }
    }
}
