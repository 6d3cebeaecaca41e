// src/errors.rs

//! Crate-wide error types and aliases.
//!
//! - [`BotError`] covers startup and plumbing failures (config, IO, HTTP).
//! - [`DownloadError`] is the terminal failure of a single request; the
//!   request handler turns it into one user-visible chat message.
//! - [`TransportError`] is what the chat transport returns. Reporting code
//!   swallows it; only uploads surface it (as the cause of an
//!   [`DownloadError::Upload`]).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure talking to the chat platform.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API rejected {method}: {description}")]
    Api { method: String, description: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal failure of a single download request.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("missing or empty URL")]
    Input,

    #[error("failed to start download engine: {0}")]
    ProcessLaunch(String),

    #[error("{message}")]
    ProcessExit { code: i32, message: String },

    #[error("download was cancelled")]
    Cancelled,

    #[error("download timed out after {0} seconds")]
    TimedOut(u64),

    #[error("{0}")]
    MetadataResolution(String),

    #[error("file not found after completion: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to send file {file}: {cause}")]
    Upload { file: String, cause: String },
}

impl DownloadError {
    /// Short machine-friendly name used in logs and request outcomes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::Input => ErrorKind::Input,
            DownloadError::ProcessLaunch(_) => ErrorKind::ProcessLaunch,
            DownloadError::ProcessExit { .. } => ErrorKind::ProcessExit,
            DownloadError::Cancelled => ErrorKind::Cancelled,
            DownloadError::TimedOut(_) => ErrorKind::TimedOut,
            DownloadError::MetadataResolution(_) | DownloadError::FileNotFound(_) => {
                ErrorKind::MetadataResolution
            }
            DownloadError::Upload { .. } => ErrorKind::Upload,
        }
    }
}

/// Discriminant of [`DownloadError`], cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    ProcessLaunch,
    ProcessExit,
    Cancelled,
    TimedOut,
    MetadataResolution,
    Upload,
}

pub type Result<T> = std::result::Result<T, BotError>;
