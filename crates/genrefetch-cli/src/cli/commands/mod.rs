//! CLI command handlers, one file per command.

mod get;
mod init;
mod plan;
mod run;
mod search;

use std::sync::Arc;

use genrefetch_core::config::GenrefetchConfig;
use genrefetch_core::source::{MediaSource, YtDlpSource};

pub use get::run_get;
pub use init::run_init;
pub use plan::run_plan;
pub use run::run_acquisition;
pub use search::run_search;

/// The media source configured in `[yt_dlp]` (or its defaults).
fn media_source(cfg: &GenrefetchConfig) -> Arc<dyn MediaSource> {
    Arc::new(YtDlpSource::new(cfg.yt_dlp.clone().unwrap_or_default()))
}
