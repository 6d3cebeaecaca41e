// src/handler/request.rs

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::context::AppContext;
use crate::download::{self, DownloadOutcome, RequestWorkspace, Stage};
use crate::errors::DownloadError;
use crate::handler::messages;
use crate::handler::{RequestOutcome, RequestState, StateTracker};
use crate::progress::reporter::ProgressReporter;
use crate::types::DownloadRequest;

/// Handle one download command end to end.
///
/// Never fails: every error is turned into a chat message and reflected in
/// the returned [`RequestOutcome`]. Once the request workspace exists it is
/// cleaned up on every path.
pub async fn handle_request(
    ctx: &AppContext,
    request: DownloadRequest,
    cancel: CancellationToken,
) -> RequestOutcome {
    let mut tracker = StateTracker::new(request.id);
    info!(request_id = %request.id, chat = %request.chat, url = %request.url, "download request received");

    tracker.transition(RequestState::Validating);
    let url = request.url.trim().to_string();
    if url.is_empty() || url.starts_with('-') {
        warn!(request_id = %request.id, url = %url, "rejecting request without a usable URL");
        send_new_message(ctx, &request, messages::USAGE).await;
        tracker.transition(RequestState::Errored(DownloadError::Input.kind()));
        return tracker.into_outcome(None, Some(messages::USAGE.to_string()));
    }
    let request = DownloadRequest { url, ..request };

    let mut workspace = match RequestWorkspace::create(&ctx.config.download_dir, request.id).await {
        Ok(ws) => ws,
        Err(e) => {
            error!(request_id = %request.id, error = %e, "could not create request workspace");
            let failure = DownloadError::ProcessLaunch(format!("could not create download directory: {e}"));
            let text = messages::failure(&request.url, &failure);
            send_new_message(ctx, &request, &text).await;
            tracker.transition(RequestState::Errored(failure.kind()));
            return tracker.into_outcome(None, Some(text));
        }
    };

    let initial = messages::starting(&request.url);
    let handle = match ctx.transport.send_text(request.chat, &initial, request.reply_to).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(request_id = %request.id, error = %e, "could not send status message; continuing without progress");
            None
        }
    };
    let mut reporter = ProgressReporter::new(ctx.transport.clone(), handle, ctx.config.progress_interval)
        .with_initial_text(&initial);

    let outcome = download::execute(ctx, &request, &workspace, &mut reporter, &cancel, |stage| {
        tracker.transition(match stage {
            Stage::Downloading => RequestState::Downloading,
            Stage::Resolving => RequestState::Resolving,
        })
    })
    .await;

    let mut uploaded = None;
    let mut error_message = None;

    match outcome {
        DownloadOutcome::Completed { path } => {
            info!(request_id = %request.id, path = %path.display(), "local download complete");
            workspace.set_artifact(path.clone());
            tracker.transition(RequestState::Uploading);

            match upload(ctx, &request, &path, &mut reporter, &cancel).await {
                Ok(()) => {
                    info!(request_id = %request.id, chat = %request.chat, path = %path.display(), "file sent");
                    reporter.set_status(&messages::uploaded(&file_name(&path))).await;
                    uploaded = Some(path);
                }
                Err(failure) => {
                    error!(request_id = %request.id, error = %failure, "upload failed");
                    tracker.transition(RequestState::Errored(failure.kind()));
                    error_message = Some(report_failure(ctx, &request, &mut reporter, &failure).await);
                }
            }
        }
        DownloadOutcome::Failed(failure) => {
            error!(request_id = %request.id, url = %request.url, error = %failure, "download failed");
            tracker.transition(RequestState::Errored(failure.kind()));
            error_message = Some(report_failure(ctx, &request, &mut reporter, &failure).await);
        }
        DownloadOutcome::Delegated { strategy } => {
            info!(request_id = %request.id, %strategy, "request delegated");
            tracker.transition(RequestState::Delegated);
            let text = messages::delegated(&request.url, &strategy);
            if !reporter.try_set_status(&text).await {
                send_new_message(ctx, &request, &text).await;
            }
        }
    }

    tracker.transition(RequestState::Cleaning);
    let report = workspace.cleanup().await;
    info!(
        request_id = %request.id,
        artifact_removed = report.artifact_removed,
        dir_removed = report.dir_removed,
        "request workspace cleaned"
    );

    // Errored and Delegated were recorded as terminal before cleaning.
    if uploaded.is_some() {
        tracker.transition(RequestState::Done);
    }
    tracker.into_outcome(uploaded, error_message)
}

async fn upload(
    ctx: &AppContext,
    request: &DownloadRequest,
    path: &Path,
    reporter: &mut ProgressReporter,
    cancel: &CancellationToken,
) -> Result<(), DownloadError> {
    let name = file_name(path);
    reporter.set_status(&messages::uploading(&name)).await;

    let caption = messages::caption(&request.url);
    let result = tokio::select! {
        result = ctx.transport.send_file(request.chat, path, &caption) => result,
        _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
    };

    result.map_err(|e| DownloadError::Upload {
        file: name,
        cause: e.to_string(),
    })
}

/// Show the failure: edit the status message, or send a new one.
async fn report_failure(
    ctx: &AppContext,
    request: &DownloadRequest,
    reporter: &mut ProgressReporter,
    failure: &DownloadError,
) -> String {
    let text = messages::failure(&request.url, failure);
    if !reporter.try_set_status(&text).await {
        send_new_message(ctx, request, &text).await;
    }
    text
}

async fn send_new_message(ctx: &AppContext, request: &DownloadRequest, text: &str) {
    if let Err(e) = ctx.transport.send_text(request.chat, text, request.reply_to).await {
        warn!(request_id = %request.id, chat = %request.chat, error = %e, "failed to send message");
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
