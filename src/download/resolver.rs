// src/download/resolver.rs

//! Recover the path of the downloaded file after a successful engine run.
//!
//! The engine is queried again in metadata mode (`-j`). An explicit
//! `filepath` in the record wins; otherwise the path is rebuilt from `title`
//! and `ext` with the restricted-filename rules the download used. The
//! rebuilt path is a guess, so it is logged as a warning.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::DownloadError;
use crate::exec::command::build_metadata_command;
use crate::exec::sanitize::sanitize_restricted;
use crate::exec::supervisor::run_captured;

/// The subset of the metadata record we use.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub filepath: Option<String>,
}

/// Where a resolved path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    /// `filepath` field of the metadata record.
    Explicit,
    /// Rebuilt from `title` + `ext`.
    Reconstructed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub source: PathSource,
}

/// Inputs for one resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub program: &'a Path,
    pub url: &'a str,
    pub output_dir: &'a Path,
    pub cookie_file: Option<&'a Path>,
}

/// Run metadata mode and return the verified artifact path.
pub async fn resolve_artifact(
    req: ResolveRequest<'_>,
    cancel: &CancellationToken,
) -> Result<PathBuf, DownloadError> {
    let plan = build_metadata_command(req.program, req.url, req.cookie_file);

    let output = run_captured(&plan, cancel)
        .await
        .map_err(|e| {
            DownloadError::MetadataResolution(format!(
                "failed to start {} for metadata: {e}",
                req.program.display()
            ))
        })?
        .ok_or(DownloadError::Cancelled)?;

    if output.code != 0 {
        let stderr = output.stderr.trim();
        let message = if stderr.is_empty() {
            format!("metadata query exited with code {}", output.code)
        } else {
            stderr.to_string()
        };
        return Err(DownloadError::MetadataResolution(message));
    }

    let metadata = parse_metadata(&output.stdout)?;
    let resolved = path_from_metadata(&metadata, req.output_dir);

    match resolved.source {
        PathSource::Explicit => {
            info!(path = %resolved.path.display(), "metadata reported file path");
        }
        PathSource::Reconstructed => {
            warn!(
                path = %resolved.path.display(),
                "metadata has no filepath; reconstructed path from title and ext, may be inaccurate"
            );
        }
    }

    verify_exists(resolved.path).await
}

/// Parse the first JSON object printed in metadata mode.
///
/// Playlists print one object per entry; the first one is used.
pub fn parse_metadata(stdout: &str) -> Result<MediaMetadata, DownloadError> {
    let mut stream = serde_json::Deserializer::from_str(stdout).into_iter::<MediaMetadata>();
    match stream.next() {
        Some(Ok(meta)) => Ok(meta),
        Some(Err(e)) => Err(DownloadError::MetadataResolution(format!(
            "failed to parse metadata JSON: {e}"
        ))),
        None => Err(DownloadError::MetadataResolution(
            "metadata query printed no JSON".to_string(),
        )),
    }
}

/// Pick the explicit path, or rebuild `{dir}/{title}.{ext}`.
pub fn path_from_metadata(metadata: &MediaMetadata, output_dir: &Path) -> ResolvedPath {
    if let Some(fp) = metadata.filepath.as_deref().filter(|p| !p.trim().is_empty()) {
        return ResolvedPath {
            path: PathBuf::from(fp),
            source: PathSource::Explicit,
        };
    }

    let title = sanitize_restricted(metadata.title.as_deref().unwrap_or("download"));
    let ext = sanitize_restricted(metadata.ext.as_deref().unwrap_or("mp4"));

    ResolvedPath {
        path: output_dir.join(format!("{title}.{ext}")),
        source: PathSource::Reconstructed,
    }
}

async fn verify_exists(path: PathBuf) -> Result<PathBuf, DownloadError> {
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {
            info!(path = %path.display(), bytes = meta.len(), "file found");
            Ok(path)
        }
        _ => Err(DownloadError::FileNotFound(path)),
    }
}
