// src/download/pipeline.rs

//! Drive one download-mode engine run.
//!
//! The supervised process's merged line stream is decoded line by line;
//! progress records feed the reporter, plain stderr text is kept as the
//! failure diagnostic. Cancellation and the optional timeout both end in
//! [`SupervisedProcess::terminate`] before this function returns.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::DownloadError;
use crate::exec::command::CommandPlan;
use crate::exec::supervisor::{OutputLine, StreamKind, SupervisedProcess};
use crate::progress::decoder::{Decoded, decode_line};
use crate::progress::reporter::ProgressReporter;

/// Number of stderr lines kept for the failure message.
pub const DIAGNOSTIC_LINES: usize = 50;

/// Bounded tail of unstructured stderr output.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    lines: VecDeque<String>,
}

impl Diagnostics {
    pub fn push(&mut self, line: &str) {
        if self.lines.len() == DIAGNOSTIC_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Captured text, or a generic message when nothing was captured.
    pub fn failure_message(&self, code: i32) -> String {
        if self.lines.is_empty() {
            format!("exited with code {code}")
        } else {
            self.lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
        }
    }
}

/// Per-run line consumer: decoder output to reporter and diagnostics.
#[derive(Debug)]
pub struct ProgressPump<'r> {
    reporter: &'r mut ProgressReporter,
    diagnostics: Diagnostics,
    finished: bool,
}

impl<'r> ProgressPump<'r> {
    pub fn new(reporter: &'r mut ProgressReporter) -> Self {
        Self {
            reporter,
            diagnostics: Diagnostics::default(),
            finished: false,
        }
    }

    /// `true` once a `finished` record has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Handle one output line. Never fails.
    pub async fn handle(&mut self, line: &OutputLine) {
        let Some(decoded) = decode_line(&line.text) else {
            return;
        };

        match decoded {
            Decoded::Progress(record) => {
                if !self.finished {
                    self.reporter.report(&record).await;
                }
            }
            Decoded::Finished(_) => {
                // Format merges report `finished` more than once.
                if !self.finished {
                    self.finished = true;
                    debug!("engine reported finished");
                    self.reporter.finish().await;
                }
            }
            Decoded::Informational(status) => {
                debug!(%status, "engine status");
            }
            Decoded::Unstructured(text) => {
                debug!(stream = ?line.stream, "engine: {}", text);
                if line.stream == StreamKind::Stderr {
                    self.diagnostics.push(&text);
                }
            }
        }
    }
}

enum Step {
    Line(Option<OutputLine>),
    Cancelled,
    TimedOut,
}

/// Run the engine to completion in download mode.
///
/// `Ok(())` means exit code 0; the artifact still has to be resolved.
pub async fn run_download(
    plan: &CommandPlan,
    reporter: &mut ProgressReporter,
    cancel: &CancellationToken,
    timeout: Option<Duration>,
) -> Result<(), DownloadError> {
    let mut process = SupervisedProcess::spawn(plan).map_err(|e| {
        DownloadError::ProcessLaunch(format!("{}: {e}", plan.program.display()))
    })?;

    let deadline = timeout.map(|t| Instant::now() + t);
    let mut pump = ProgressPump::new(reporter);

    loop {
        let step = tokio::select! {
            line = process.next_line() => Step::Line(line),
            _ = cancel.cancelled() => Step::Cancelled,
            _ = deadline_reached(deadline) => Step::TimedOut,
        };

        match step {
            Step::Line(Some(line)) => pump.handle(&line).await,
            Step::Line(None) => break,
            Step::Cancelled => {
                info!("download cancelled; terminating engine");
                process.terminate().await;
                return Err(DownloadError::Cancelled);
            }
            Step::TimedOut => {
                let secs = timeout.map(|t| t.as_secs()).unwrap_or_default();
                warn!(timeout_secs = secs, "download timed out; terminating engine");
                process.terminate().await;
                return Err(DownloadError::TimedOut(secs));
            }
        }
    }

    let code = tokio::select! {
        code = process.wait() => code.map_err(|e| DownloadError::ProcessExit {
            code: -1,
            message: format!("failed to wait for engine: {e}"),
        })?,
        _ = cancel.cancelled() => {
            process.terminate().await;
            return Err(DownloadError::Cancelled);
        }
    };

    if code == 0 {
        if !pump.is_finished() {
            debug!("engine exited 0 without a finished record");
        }
        Ok(())
    } else {
        Err(DownloadError::ProcessExit {
            code,
            message: pump.diagnostics().failure_message(code),
        })
    }
}

async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(d) => sleep_until(d).await,
        None => std::future::pending().await,
    }
}
