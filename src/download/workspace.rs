// src/download/workspace.rs

//! Per-request download directory.
//!
//! Every request writes under `{download_dir}/{request_id}/`, so two requests
//! for media with the same title never touch the same file. The workspace
//! owns the artifact path once it is known and deletes it exactly once:
//! [`RequestWorkspace::cleanup`] consumes the workspace, and `Drop` removes
//! the directory if the owning task was cancelled before cleanup ran.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug)]
pub struct RequestWorkspace {
    dir: PathBuf,
    artifact: Option<PathBuf>,
    cleaned: bool,
}

/// What [`RequestWorkspace::cleanup`] managed to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    pub artifact_removed: bool,
    pub dir_removed: bool,
}

impl RequestWorkspace {
    /// Create `{root}/{id}/`.
    pub async fn create(root: &Path, id: Uuid) -> io::Result<Self> {
        let dir = root.join(id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "created request workspace");
        Ok(Self {
            dir,
            artifact: None,
            cleaned: false,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record the resolved artifact so cleanup deletes it.
    pub fn set_artifact(&mut self, path: PathBuf) {
        self.artifact = Some(path);
    }

    pub fn artifact(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }

    /// Delete the artifact (if any) and the request directory.
    ///
    /// Failures are logged, never returned.
    pub async fn cleanup(mut self) -> CleanupReport {
        self.cleaned = true;
        let mut report = CleanupReport::default();

        if let Some(artifact) = self.artifact.take() {
            match tokio::fs::remove_file(&artifact).await {
                Ok(()) => {
                    info!(file = %artifact.display(), "deleted local file");
                    report.artifact_removed = true;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(file = %artifact.display(), "local file already gone");
                }
                Err(e) => {
                    warn!(file = %artifact.display(), error = %e, "failed to delete local file");
                }
            }
        }

        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => report.dir_removed = true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => report.dir_removed = true,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "failed to remove request workspace");
            }
        }

        report
    }
}

impl Drop for RequestWorkspace {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        // Reached only when the owning future was dropped mid-request.
        if let Some(artifact) = self.artifact.take() {
            match std::fs::remove_file(&artifact) {
                Ok(()) => debug!(file = %artifact.display(), "deleted local file of abandoned request"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(file = %artifact.display(), error = %e, "failed to delete local file of abandoned request"),
            }
        }
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(dir = %self.dir.display(), "removed abandoned request workspace"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(dir = %self.dir.display(), error = %e, "failed to remove abandoned request workspace"),
        }
    }
}
