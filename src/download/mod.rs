// src/download/mod.rs

//! The download orchestration pipeline for one request.
//!
//! [`execute`] builds the engine command, runs it under supervision while
//! progress is reported, resolves the artifact path and, on failure, gives
//! an optional [`BypassStrategy`] the chance to take over. The result is an
//! explicit [`DownloadOutcome`].

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::errors::DownloadError;
use crate::exec::command::build_download_command;
use crate::progress::reporter::ProgressReporter;
use crate::types::DownloadRequest;

pub mod bypass;
pub mod pipeline;
pub mod resolver;
pub mod workspace;

pub use bypass::{BypassDecision, BypassStrategy, is_bypassable};
pub use pipeline::{Diagnostics, ProgressPump, run_download};
pub use resolver::{MediaMetadata, PathSource, ResolvedPath, path_from_metadata, resolve_artifact};
pub use workspace::{CleanupReport, RequestWorkspace};

/// Terminal result of the download stage.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The engine succeeded and the file exists at `path`.
    Completed { path: PathBuf },
    Failed(DownloadError),
    /// A bypass strategy took over the request.
    Delegated { strategy: String },
}

/// Which sub-stage a [`DownloadOutcome`] was produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Downloading,
    Resolving,
}

/// Run download + resolution for `request` inside `workspace`.
///
/// `on_stage` is called when resolution starts, so callers can track their
/// own state machine.
pub async fn execute(
    ctx: &AppContext,
    request: &DownloadRequest,
    workspace: &RequestWorkspace,
    reporter: &mut ProgressReporter,
    cancel: &CancellationToken,
    mut on_stage: impl FnMut(Stage),
) -> DownloadOutcome {
    let cfg = &ctx.config;
    let cookie_file = request.cookie_file.as_deref();

    on_stage(Stage::Downloading);
    let plan = build_download_command(&cfg.engine_binary, &request.url, workspace.dir(), cookie_file);
    for warning in &plan.warnings {
        warn!(request_id = %request.id, "{}", warning);
    }

    let result = match run_download(&plan, reporter, cancel, cfg.download_timeout).await {
        Ok(()) => {
            on_stage(Stage::Resolving);
            resolver::resolve_artifact(
                resolver::ResolveRequest {
                    program: &cfg.engine_binary,
                    url: &request.url,
                    output_dir: workspace.dir(),
                    cookie_file,
                },
                cancel,
            )
            .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(path) => DownloadOutcome::Completed { path },
        Err(failure) => try_bypass(ctx, request, failure).await,
    }
}

async fn try_bypass(ctx: &AppContext, request: &DownloadRequest, failure: DownloadError) -> DownloadOutcome {
    let Some(strategy) = ctx.bypass.as_ref() else {
        return DownloadOutcome::Failed(failure);
    };
    if !is_bypassable(&failure) {
        return DownloadOutcome::Failed(failure);
    }

    info!(request_id = %request.id, strategy = strategy.name(), error = %failure, "consulting bypass strategy");
    match strategy.attempt(request, &failure).await {
        BypassDecision::Delegated => DownloadOutcome::Delegated {
            strategy: strategy.name().to_string(),
        },
        BypassDecision::Declined => {
            info!(request_id = %request.id, strategy = strategy.name(), "bypass strategy declined");
            DownloadOutcome::Failed(failure)
        }
    }
}
