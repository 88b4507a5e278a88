//! Classify media source errors into retry policy error kinds.

use crate::retry::policy::ErrorKind;
use crate::source::SourceError;

/// Classify yt-dlp style stderr output. yt-dlp reports network trouble only
/// as text, so this looks for the phrases it prints.
pub fn classify_stderr(stderr: &str) -> ErrorKind {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("http error 429") || lower.contains("too many requests") {
        return ErrorKind::Throttled;
    }
    if lower.contains("timed out") {
        return ErrorKind::Timeout;
    }
    if lower.contains("connection reset")
        || lower.contains("connection refused")
        || lower.contains("name resolution")
        || lower.contains("network is unreachable")
        || lower.contains("unable to download api page")
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

pub fn classify(e: &SourceError) -> ErrorKind {
    match e {
        SourceError::Timeout(_) => ErrorKind::Timeout,
        SourceError::Exit { stderr, .. } => classify_stderr(stderr),
        SourceError::Unavailable(_) => ErrorKind::Connection,
        SourceError::Spawn { .. }
        | SourceError::Decode(_)
        | SourceError::MissingArtifact(_)
        | SourceError::Io(_)
        | SourceError::Rejected(_)
        | SourceError::Crashed(_) => ErrorKind::Other,
    }
}
