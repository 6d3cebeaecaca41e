// src/bot/dispatcher.rs

//! Main inbound loop: pull messages, spawn one task per download command.
//!
//! Request tasks run on a shared `TaskTracker`. Each one gets a child token
//! of the shutdown token, so cancelling shutdown terminates every engine
//! process; [`Dispatcher::run`] only returns after all request tasks ended.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::bot::commands::{BotCommand, parse_command};
use crate::bot::source::{ChatKind, CommandSource, InboundMessage};
use crate::context::AppContext;
use crate::errors::Result;
use crate::handler::{handle_request, messages};
use crate::types::DownloadRequest;

/// Pause after a failed poll before trying again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct Dispatcher<S: CommandSource> {
    ctx: Arc<AppContext>,
    source: S,
    tasks: TaskTracker,
    shutdown: CancellationToken,
}

impl<S: CommandSource> std::fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("ctx", &self.ctx)
            .field("active_requests", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl<S: CommandSource> Dispatcher<S> {
    pub fn new(ctx: Arc<AppContext>, source: S, shutdown: CancellationToken) -> Self {
        Self {
            ctx,
            source,
            tasks: TaskTracker::new(),
            shutdown,
        }
    }

    /// Poll until `shutdown` is cancelled, then wait for in-flight requests.
    pub async fn run(mut self) -> Result<()> {
        info!("dispatcher started");

        loop {
            let batch = tokio::select! {
                batch = self.source.next_batch() => batch,
                _ = self.shutdown.cancelled() => break,
            };

            match batch {
                Ok(messages) => {
                    for message in messages {
                        self.dispatch(message).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, retry_secs = POLL_RETRY_DELAY.as_secs(), "polling for messages failed");
                    tokio::select! {
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                        _ = self.shutdown.cancelled() => break,
                    }
                }
            }
        }

        info!(active_requests = self.tasks.len(), "shutdown requested; waiting for requests to finish");
        self.tasks.close();
        self.tasks.wait().await;
        info!("dispatcher stopped");
        Ok(())
    }

    async fn dispatch(&self, message: InboundMessage) {
        if message.chat_kind != ChatKind::Private {
            debug!(chat = %message.chat, kind = ?message.chat_kind, "ignoring message outside a private chat");
            return;
        }

        match parse_command(&message.text) {
            Some(BotCommand::Download { url }) => {
                let request = DownloadRequest::new(url, message.chat)
                    .with_reply_to(message.message_id)
                    .with_cookie_file(self.ctx.config.cookie_file.clone());
                self.spawn_request(request);
            }
            Some(BotCommand::Help) => {
                if let Err(e) = self
                    .ctx
                    .transport
                    .send_text(message.chat, messages::USAGE, Some(message.message_id))
                    .await
                {
                    warn!(chat = %message.chat, error = %e, "failed to send help text");
                }
            }
            None => {
                debug!(chat = %message.chat, "ignoring non-command message");
            }
        }
    }

    fn spawn_request(&self, request: DownloadRequest) {
        let ctx = Arc::clone(&self.ctx);
        let cancel = self.shutdown.child_token();
        let request_id = request.id;

        // The inner task isolates panics so they are logged, not lost.
        let inner = tokio::spawn(async move { handle_request(&ctx, request, cancel).await });
        self.tasks.spawn(async move {
            match inner.await {
                Ok(outcome) => {
                    debug!(request_id = %outcome.request_id, final_state = ?outcome.final_state, "request task finished");
                }
                Err(e) if e.is_cancelled() => {
                    debug!(%request_id, "request task cancelled");
                }
                Err(e) => {
                    error!(%request_id, error = %e, "request task panicked");
                }
            }
        });
    }
}
