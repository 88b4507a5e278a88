//! `MediaSource` backed by the `yt-dlp` executable.
//!
//! Search uses `ytsearchN:` with `--flat-playlist` so no media is touched;
//! fetch extracts audio into `<dest>/<clean title>.<audio_format>`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use super::{Candidate, MediaSource, SourceError};
use crate::config::YtDlpConfig;
use crate::naming;

const WATCH_URL: &str = "https://www.youtube.com/watch";

#[derive(Debug, Deserialize)]
struct SearchOutput {
    #[serde(default)]
    entries: Vec<Option<SearchEntry>>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// Parses `--dump-single-json` search output into candidates, dropping the
/// first `offset` entries. Entries with neither id nor url are skipped.
pub fn parse_search_output(json: &str, offset: usize) -> Result<Vec<Candidate>, SourceError> {
    let out: SearchOutput = serde_json::from_str(json)?;
    let candidates = out
        .entries
        .into_iter()
        .skip(offset)
        .flatten()
        .filter_map(|e| {
            let id = e.id.unwrap_or_default();
            let reference = match e.url.filter(|u| !u.is_empty()) {
                Some(u) => u,
                None if !id.is_empty() => watch_url(&id),
                None => return None,
            };
            Some(Candidate {
                id,
                title: e.title.unwrap_or_default(),
                reference,
                duration_secs: e.duration.filter(|d| *d > 0.0).map(|d| d as u64).unwrap_or(0),
            })
        })
        .collect();
    Ok(candidates)
}

fn watch_url(id: &str) -> String {
    match url::Url::parse_with_params(WATCH_URL, &[("v", id)]) {
        Ok(u) => u.to_string(),
        Err(_) => format!("{}?v={}", WATCH_URL, id),
    }
}

/// yt-dlp output templates treat `%` as a field marker.
fn escape_template(s: &str) -> String {
    s.replace('%', "%%")
}

#[derive(Debug, Clone, Default)]
pub struct YtDlpSource {
    cfg: YtDlpConfig,
}

impl YtDlpSource {
    pub fn new(cfg: YtDlpConfig) -> Self {
        Self { cfg }
    }

    async fn invoke(&self, args: &[String]) -> Result<String, SourceError> {
        let mut cmd = Command::new(&self.cfg.program);
        cmd.args(args)
            .args(&self.cfg.extra_args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        // Own process group: a terminal Ctrl-C must not reach in-flight fetches.
        #[cfg(unix)]
        cmd.process_group(0);
        let output = cmd
            .output()
            .await
            .map_err(|source| SourceError::Spawn {
                program: self.cfg.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl MediaSource for YtDlpSource {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Candidate>, SourceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let args = vec![
            "--flat-playlist".to_string(),
            "--dump-single-json".to_string(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            format!("ytsearch{}:{}", limit + offset, query),
        ];
        let stdout = self.invoke(&args).await?;
        let mut candidates = parse_search_output(&stdout, offset)?;
        candidates.truncate(limit);
        tracing::debug!(query, limit, offset, found = candidates.len(), "yt-dlp search");
        Ok(candidates)
    }

    async fn fetch(&self, candidate: &Candidate, dest: &Path) -> Result<PathBuf, SourceError> {
        let stem = naming::artifact_stem(&candidate.title, &candidate.id);
        let template = dest.join(format!("{}.%(ext)s", escape_template(&stem)));
        let args = vec![
            "--no-playlist".to_string(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "-f".to_string(),
            "bestaudio/best".to_string(),
            "-x".to_string(),
            "--audio-format".to_string(),
            self.cfg.audio_format.clone(),
            "--audio-quality".to_string(),
            self.cfg.audio_quality.clone(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
            candidate.reference.clone(),
        ];
        self.invoke(&args).await?;

        let artifact = naming::artifact_path(
            dest,
            &candidate.title,
            &candidate.id,
            &self.cfg.audio_format,
        );
        if tokio::fs::try_exists(&artifact).await? {
            Ok(artifact)
        } else {
            Err(SourceError::MissingArtifact(artifact))
        }
    }
}
