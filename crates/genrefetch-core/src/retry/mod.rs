//! Retry and backoff policy for search calls.
//!
//! Classifies media source failures (timeouts, throttling, connection
//! trouble) and decides exponential backoff, so the paginator can tell a
//! transient outage apart from an exhausted term when configured to.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_stderr};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
