use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Search retry parameters (optional `[search_retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of search attempts per page (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 30,
        }
    }
}

/// Settings for the bundled yt-dlp media source (optional `[yt_dlp]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtDlpConfig {
    /// Executable name or path.
    pub program: String,
    /// Audio codec passed to `--audio-format`; also the artifact extension.
    pub audio_format: String,
    /// Value passed to `--audio-quality`.
    pub audio_quality: String,
    /// Extra arguments appended to every invocation (e.g. `--cookies`).
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "192K".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Global configuration loaded from `~/.config/genrefetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenrefetchConfig {
    /// Candidates requested per search call.
    pub page_size: usize,
    /// Maximum concurrent fetches within one page.
    pub max_workers: usize,
    /// Deadline for a single fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// Deadline for a single search call, in seconds.
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,
    /// Base directory holding one subdirectory per genre. Defaults to the XDG data dir.
    #[serde(default)]
    pub datasets_dir: Option<PathBuf>,
    /// Genre catalog (JSON). Defaults to `genres.json` next to this file.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Optional search retry policy; if missing, a failed search ends the term.
    #[serde(default)]
    pub search_retry: Option<RetryConfig>,
    #[serde(default)]
    pub yt_dlp: Option<YtDlpConfig>,
}

fn default_search_timeout_secs() -> u64 {
    120
}

impl Default for GenrefetchConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_workers: 4,
            fetch_timeout_secs: 600,
            search_timeout_secs: default_search_timeout_secs(),
            datasets_dir: None,
            catalog_path: None,
            search_retry: None,
            yt_dlp: None,
        }
    }
}

impl GenrefetchConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs.max(1))
    }

    pub fn datasets_dir(&self) -> Result<PathBuf> {
        match &self.datasets_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_datasets_dir(),
        }
    }

    pub fn catalog_path(&self) -> Result<PathBuf> {
        match &self.catalog_path {
            Some(path) => Ok(path.clone()),
            None => default_catalog_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("genrefetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

pub fn default_catalog_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("genrefetch")?;
    Ok(xdg_dirs.get_config_home().join("genrefetch").join("genres.json"))
}

pub fn default_datasets_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("genrefetch")?;
    Ok(xdg_dirs.get_data_home().join("genrefetch").join("datasets"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GenrefetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GenrefetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GenrefetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
