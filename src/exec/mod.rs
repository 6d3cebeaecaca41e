// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for running the external download engine
//! using `tokio::process::Command`.
//!
//! - [`command`] builds the argument vectors for download and metadata mode.
//! - [`supervisor`] owns a running child: merged line stream, exit wait,
//!   graceful-then-forced termination.
//! - [`sanitize`] mirrors the engine's restricted filename rules.

pub mod command;
pub mod sanitize;
pub mod supervisor;

pub use command::{CommandPlan, CommandWarning, build_download_command, build_metadata_command};
pub use sanitize::sanitize_restricted;
pub use supervisor::{
    CapturedOutput, OutputLine, StreamKind, SupervisedProcess, TerminateOutcome, run_captured,
};
