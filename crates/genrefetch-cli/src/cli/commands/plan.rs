//! `genrefetch plan` – show how each genre's target splits across its terms.

use anyhow::Result;
use genrefetch_core::catalog::Catalog;
use genrefetch_core::scheduler::QuotaPlan;
use std::path::Path;

pub fn run_plan(catalog_path: &Path) -> Result<()> {
    let catalog = Catalog::load(catalog_path)?;
    if catalog.is_empty() {
        println!("No genres in catalog.");
        return Ok(());
    }
    println!(
        "{:<20} {:>8} {:>6} {:>10} {:>8}",
        "GENRE", "TARGET", "TERMS", "PER-TERM", "DROPPED"
    );
    for spec in catalog.collections() {
        match QuotaPlan::for_collection(spec) {
            Ok(p) => println!(
                "{:<20} {:>8} {:>6} {:>10} {:>8}",
                p.name, p.target_count, p.term_count, p.quota_per_term, p.dropped
            ),
            Err(e) => println!("{:<20} {}", spec.name, e),
        }
    }
    Ok(())
}
