// src/progress/mod.rs

//! Progress stream handling: decode engine lines, render them, and push
//! throttled edits to the status message.

pub mod decoder;
pub mod format;
pub mod reporter;

pub use decoder::{Decoded, ProgressRecord, ProgressStatus, decode_line};
pub use format::{COMPLETION_TEXT, format_bytes, format_eta, format_percent, format_speed, render_progress};
pub use reporter::{ProgressReporter, ReporterState};
