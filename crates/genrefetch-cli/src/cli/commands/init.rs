//! `genrefetch init` – create the per-genre directory layout.

use anyhow::{Context, Result};
use genrefetch_core::catalog::{self, Catalog};
use std::path::Path;

pub fn run_init(catalog_path: &Path, datasets_dir: &Path) -> Result<()> {
    let catalog = Catalog::load(catalog_path)?;
    let dirs = catalog::create_collection_dirs(datasets_dir, &catalog)
        .with_context(|| format!("create genre dirs under {}", datasets_dir.display()))?;
    for dir in &dirs {
        println!("{}", dir.display());
    }
    tracing::info!(count = dirs.len(), base = %datasets_dir.display(), "genre directories ready");
    Ok(())
}
