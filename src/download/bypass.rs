// src/download/bypass.rs

//! Optional hook consulted when a download fails.
//!
//! A strategy may take over a failed request (for example by routing it
//! through another fetcher). No strategy ships with the bot; the request
//! handler works the same with none configured.

use std::future::Future;
use std::pin::Pin;

use crate::errors::DownloadError;
use crate::types::DownloadRequest;

/// What a strategy decided for one failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassDecision {
    /// Not handled; the failure is reported as usual.
    Declined,
    /// The strategy took over; the user is told the request was handed off.
    Delegated,
}

pub type BypassFuture<'a> = Pin<Box<dyn Future<Output = BypassDecision> + Send + 'a>>;

pub trait BypassStrategy: Send + Sync {
    /// Name shown in logs and in the hand-off message.
    fn name(&self) -> &str;

    fn attempt<'a>(&'a self, request: &'a DownloadRequest, failure: &'a DownloadError) -> BypassFuture<'a>;
}

/// Whether a failure is one a strategy can do anything about.
pub fn is_bypassable(failure: &DownloadError) -> bool {
    matches!(
        failure,
        DownloadError::ProcessExit { .. }
            | DownloadError::MetadataResolution(_)
            | DownloadError::FileNotFound(_)
    )
}
