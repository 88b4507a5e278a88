//! `genrefetch get` – fetch the top results of a single query.

use anyhow::Result;
use genrefetch_core::config::GenrefetchConfig;
use genrefetch_core::scheduler::{self, AcquireSettings};
use std::path::Path;

use super::media_source;

pub async fn run_get(
    cfg: &GenrefetchConfig,
    query: &str,
    limit: usize,
    dest: &Path,
    settings: &AcquireSettings,
) -> Result<()> {
    let source = media_source(cfg);
    let paths = scheduler::search_and_fetch(&source, query, limit, dest, settings).await?;
    if paths.is_empty() {
        println!("Nothing fetched for {:?}.", query);
    }
    for p in &paths {
        println!("Downloaded: {}", p.display());
    }
    Ok(())
}
