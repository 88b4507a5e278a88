//! `genrefetch search` – list candidates without fetching.

use anyhow::Result;
use genrefetch_core::config::GenrefetchConfig;
use genrefetch_core::source::MediaSource;

use super::media_source;

pub async fn run_search(
    cfg: &GenrefetchConfig,
    query: &str,
    limit: usize,
    offset: usize,
) -> Result<()> {
    let source = media_source(cfg);
    let candidates = source.search(query, limit, offset).await?;
    if candidates.is_empty() {
        println!("No results for {:?}.", query);
        return Ok(());
    }
    println!("{:<14} {:>8}  {}", "ID", "DURATION", "TITLE");
    for c in candidates {
        println!(
            "{:<14} {:>8}  {}",
            c.id,
            format_duration(c.duration_secs),
            c.title
        );
    }
    Ok(())
}

pub(crate) fn format_duration(secs: u64) -> String {
    if secs == 0 {
        return "-".to_string();
    }
    format!("{}:{:02}", secs / 60, secs % 60)
}
