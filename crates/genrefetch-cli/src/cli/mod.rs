//! CLI for genrefetch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use genrefetch_core::config::{self, GenrefetchConfig};
use genrefetch_core::scheduler::AcquireSettings;
use std::path::PathBuf;

use commands::{run_acquisition, run_get, run_init, run_plan, run_search};

/// Top-level CLI for genrefetch.
#[derive(Debug, Parser)]
#[command(name = "genrefetch")]
#[command(about = "Fetch a quota of tracks per genre from a media source", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Acquire tracks for every genre in the catalog.
    Run {
        /// Genre catalog (JSON). Defaults to the configured catalog.
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,
        /// Base directory; one subdirectory per genre is created inside.
        #[arg(long, value_name = "DIR")]
        datasets_dir: Option<PathBuf>,
        /// Candidates requested per search call.
        #[arg(long, value_name = "N")]
        page_size: Option<usize>,
        /// Maximum concurrent fetches per page.
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Only acquire these genres (repeatable). Catalog order is kept.
        #[arg(long = "genre", value_name = "NAME")]
        genres: Vec<String>,
        /// Write the run report as JSON to this file.
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Show the per-term quota for each genre without fetching anything.
    Plan {
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,
    },

    /// Create one directory per genre under the datasets directory.
    Init {
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,
        #[arg(long, value_name = "DIR")]
        datasets_dir: Option<PathBuf>,
    },

    /// Search the media source and list candidates.
    Search {
        query: String,
        #[arg(long, default_value = "10", value_name = "N")]
        limit: usize,
        #[arg(long, default_value = "0", value_name = "N")]
        offset: usize,
    },

    /// Search once and fetch the top results into a directory.
    Get {
        query: String,
        #[arg(long, default_value = "1", value_name = "N")]
        limit: usize,
        /// Destination directory (default: current directory).
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
    },
}

/// Config with CLI overrides applied.
pub(crate) fn settings_with_overrides(
    cfg: &GenrefetchConfig,
    page_size: Option<usize>,
    workers: Option<usize>,
) -> AcquireSettings {
    let mut cfg = cfg.clone();
    if let Some(n) = page_size {
        cfg.page_size = n;
    }
    if let Some(n) = workers {
        cfg.max_workers = n;
    }
    AcquireSettings::from_config(&cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                catalog,
                datasets_dir,
                page_size,
                workers,
                genres,
                report,
            } => {
                let catalog = catalog.map_or_else(|| cfg.catalog_path(), Ok)?;
                let datasets_dir = datasets_dir.map_or_else(|| cfg.datasets_dir(), Ok)?;
                let settings = settings_with_overrides(&cfg, page_size, workers);
                run_acquisition(&cfg, &catalog, &datasets_dir, settings, &genres, report.as_deref())
                    .await?;
            }
            CliCommand::Plan { catalog } => {
                let catalog = catalog.map_or_else(|| cfg.catalog_path(), Ok)?;
                run_plan(&catalog)?;
            }
            CliCommand::Init {
                catalog,
                datasets_dir,
            } => {
                let catalog = catalog.map_or_else(|| cfg.catalog_path(), Ok)?;
                let datasets_dir = datasets_dir.map_or_else(|| cfg.datasets_dir(), Ok)?;
                run_init(&catalog, &datasets_dir)?;
            }
            CliCommand::Search {
                query,
                limit,
                offset,
            } => run_search(&cfg, &query, limit, offset).await?,
            CliCommand::Get {
                query,
                limit,
                dest,
                workers,
            } => {
                let dest = match dest {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                let settings = settings_with_overrides(&cfg, None, workers);
                run_get(&cfg, &query, limit, &dest, &settings).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
