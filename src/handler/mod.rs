// src/handler/mod.rs

//! Per-request handling.
//!
//! One [`handle_request`] call drives a single command through
//! `Received → Validating → Downloading → Resolving → Uploading → Cleaning → Done`.
//! Any failure moves to `Errored`, which still passes through `Cleaning`.
//! Every terminal error becomes exactly one user-visible chat message.

use std::path::PathBuf;

use tracing::info;
use uuid::Uuid;

use crate::errors::ErrorKind;

pub mod messages;
pub mod request;

pub use request::handle_request;

/// States of the request state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Validating,
    Downloading,
    Resolving,
    Uploading,
    Cleaning,
    Done,
    Errored(ErrorKind),
    /// A bypass strategy took the request over.
    Delegated,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Done | RequestState::Errored(_) | RequestState::Delegated
        )
    }
}

/// What happened to one request.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub request_id: Uuid,
    /// `Done`, `Errored(_)` or `Delegated`.
    pub final_state: RequestState,
    /// Every state entered, in order.
    pub history: Vec<RequestState>,
    /// File that was uploaded (and deleted afterwards).
    pub uploaded: Option<PathBuf>,
    /// User-visible failure text, if the request failed.
    pub error_message: Option<String>,
}

/// Records and logs state transitions of one request.
#[derive(Debug)]
pub(crate) struct StateTracker {
    request_id: Uuid,
    current: RequestState,
    history: Vec<RequestState>,
    terminal: Option<RequestState>,
}

impl StateTracker {
    pub(crate) fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            current: RequestState::Received,
            history: vec![RequestState::Received],
            terminal: None,
        }
    }

    pub(crate) fn transition(&mut self, next: RequestState) {
        if self.current == next {
            return;
        }
        info!(request_id = %self.request_id, from = ?self.current, to = ?next, "request state change");
        self.current = next;
        self.history.push(next);
        if next.is_terminal() && self.terminal.is_none() {
            self.terminal = Some(next);
        }
    }

    pub(crate) fn into_outcome(self, uploaded: Option<PathBuf>, error_message: Option<String>) -> RequestOutcome {
        RequestOutcome {
            request_id: self.request_id,
            final_state: self.terminal.unwrap_or(self.current),
            history: self.history,
            uploaded,
            error_message,
        }
    }
}
