// src/progress/reporter.rs

//! Throttled status-message updates.
//!
//! [`ReporterState`] is the pure decision core: given a rendered text, the
//! record's fraction and the current time, it says whether an edit should be
//! issued. [`ProgressReporter`] is the async shell that renders records and
//! pushes the edits through the chat transport.
//!
//! Rules:
//! - an edit is issued only if the text differs from the last issued text;
//! - progress edits additionally need `min_interval` to have passed since the
//!   last issued edit, unless the fraction is exactly `1.0`;
//! - the completion edit ignores the time rule.
//!
//! An issued edit counts even if the transport rejects it.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::progress::decoder::ProgressRecord;
use crate::progress::format::{COMPLETION_TEXT, render_progress};
use crate::transport::ChatTransport;
use crate::types::MessageHandle;

/// Throttle/suppression state for one status message.
#[derive(Debug, Clone)]
pub struct ReporterState {
    min_interval: Duration,
    last_update: Option<Instant>,
    last_text: Option<String>,
}

impl ReporterState {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_update: None,
            last_text: None,
        }
    }

    /// Decide on a progress edit. Returns `true` (and records it) if the
    /// edit should be issued.
    pub fn offer_progress(&mut self, text: &str, fraction: Option<f64>, now: Instant) -> bool {
        let due = match self.last_update {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.min_interval,
        };
        let complete = fraction == Some(1.0);

        if !(due || complete) {
            return false;
        }
        self.offer_unthrottled(text, now)
    }

    /// Decide on an edit that only obeys equality suppression.
    pub fn offer_unthrottled(&mut self, text: &str, now: Instant) -> bool {
        if self.last_text.as_deref() == Some(text) {
            return false;
        }
        self.last_text = Some(text.to_string());
        self.last_update = Some(now);
        true
    }

    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }
}

/// Pushes rendered progress into one status message.
///
/// Without a handle (the status message could not be sent) every call is a
/// no-op apart from the throttle bookkeeping.
pub struct ProgressReporter {
    transport: Arc<dyn ChatTransport>,
    handle: Option<MessageHandle>,
    state: ReporterState,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("handle", &self.handle)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ProgressReporter {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        handle: Option<MessageHandle>,
        min_interval: Duration,
    ) -> Self {
        Self {
            transport,
            handle,
            state: ReporterState::new(min_interval),
        }
    }

    /// Text of the status message as it was created, so the first progress
    /// edit is not suppressed against a stale value.
    pub fn with_initial_text(mut self, text: &str) -> Self {
        self.state.last_text = Some(text.to_string());
        self
    }

    pub fn handle(&self) -> Option<MessageHandle> {
        self.handle
    }

    /// Report one `downloading` / `extracting` record.
    pub async fn report(&mut self, record: &ProgressRecord) {
        let text = render_progress(record);
        if self.state.offer_progress(&text, record.fraction, Instant::now()) {
            self.push(&text).await;
        }
    }

    /// Final edit after the engine reported `finished`.
    pub async fn finish(&mut self) {
        self.set_status(COMPLETION_TEXT).await;
    }

    /// Replace the status text (equality suppression only).
    pub async fn set_status(&mut self, text: &str) {
        if self.state.offer_unthrottled(text, Instant::now()) {
            self.push(text).await;
        }
    }

    /// Edit the status message and report whether the edit went through.
    ///
    /// Used for the terminal failure message, where the caller falls back to
    /// sending a new message.
    pub async fn try_set_status(&mut self, text: &str) -> bool {
        let Some(handle) = self.handle else {
            return false;
        };
        if !self.state.offer_unthrottled(text, Instant::now()) {
            return true;
        }
        match self.transport.edit_text(&handle, text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(chat = %handle.chat, error = %e, "status edit failed");
                false
            }
        }
    }

    async fn push(&self, text: &str) {
        let Some(handle) = self.handle else {
            debug!("no status message; skipping edit");
            return;
        };
        if let Err(e) = self.transport.edit_text(&handle, text).await {
            warn!(chat = %handle.chat, error = %e, "status edit failed; continuing");
        }
    }
}
