//! Tunables for one acquisition run.

use std::time::Duration;

use crate::config::GenrefetchConfig;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Copy)]
pub struct AcquireSettings {
    /// Candidates requested per search call.
    pub page_size: usize,
    /// Upper bound on simultaneous fetches within one page.
    pub max_workers: usize,
    /// Deadline applied to each fetch.
    pub fetch_timeout: Duration,
    /// Deadline applied to each search call.
    pub search_timeout: Duration,
    /// Retry policy for search calls.
    pub search_retry: RetryPolicy,
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self::from_config(&GenrefetchConfig::default())
    }
}

impl AcquireSettings {
    pub fn from_config(cfg: &GenrefetchConfig) -> Self {
        Self {
            page_size: cfg.page_size.max(1),
            max_workers: cfg.max_workers.max(1),
            fetch_timeout: cfg.fetch_timeout(),
            search_timeout: cfg.search_timeout(),
            search_retry: cfg
                .search_retry
                .as_ref()
                .map(RetryPolicy::from)
                .unwrap_or_default(),
        }
    }
}
