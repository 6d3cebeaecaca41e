// src/exec/supervisor.rs

//! Supervision of one engine child process.
//!
//! The child is spawned with both output pipes captured. One background task
//! per pipe reads lines incrementally and forwards them into a bounded
//! channel, so the owner sees a single ordered stream of [`OutputLine`]s and
//! never blocks the runtime on process I/O.
//!
//! If the owner stops reading, the reader tasks keep draining (and discard)
//! so the child can never stall on a full pipe.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::exec::command::CommandPlan;

/// How long a signal gets to take effect before escalating.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(5);

const LINE_CHANNEL_CAPACITY: usize = 256;

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// One line of child output, without the trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: StreamKind,
    pub text: String,
}

/// How a [`SupervisedProcess::terminate`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateOutcome {
    /// The child had already exited.
    AlreadyExited,
    /// The child exited after the graceful signal.
    Terminated,
    /// The child had to be killed.
    Killed,
    /// The child survived both signals (or could not be waited on).
    Unresponsive,
}

/// Full output of a short-lived child.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// A running engine process plus its merged line stream.
#[derive(Debug)]
pub struct SupervisedProcess {
    child: Child,
    lines: mpsc::Receiver<OutputLine>,
    label: String,
}

impl SupervisedProcess {
    /// Start the child described by `plan`.
    ///
    /// `kill_on_drop` is set, so dropping the handle without calling
    /// [`terminate`](Self::terminate) still reaps the process.
    pub fn spawn(plan: &CommandPlan) -> io::Result<Self> {
        let label = plan.program.display().to_string();
        info!(cmd = %plan.display_line(), "starting engine process");

        let mut cmd = Command::new(&plan.program);
        cmd.args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;
        debug!(program = %label, pid = ?child.id(), "engine process spawned");

        let (tx, rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);

        if let Some(stdout) = child.stdout.take() {
            spawn_line_reader(stdout, StreamKind::Stdout, tx.clone(), label.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_reader(stderr, StreamKind::Stderr, tx, label.clone());
        }

        Ok(Self {
            child,
            lines: rx,
            label,
        })
    }

    /// OS process id, if the child is still known to be running.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Next output line from either pipe; `None` once both pipes are closed.
    pub async fn next_line(&mut self) -> Option<OutputLine> {
        self.lines.recv().await
    }

    /// Wait for the child to exit and return its exit code.
    ///
    /// A child killed by a signal reports `-1`.
    pub async fn wait(&mut self) -> io::Result<i32> {
        let status = self.child.wait().await?;
        let code = status.code().unwrap_or(-1);
        info!(program = %self.label, exit_code = code, success = status.success(), "engine process exited");
        Ok(code)
    }

    /// Stop the child: SIGTERM, wait up to [`TERMINATE_GRACE`], then SIGKILL
    /// and wait again.
    pub async fn terminate(&mut self) -> TerminateOutcome {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(program = %self.label, ?status, "terminate requested but process already exited");
                return TerminateOutcome::AlreadyExited;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(program = %self.label, error = %e, "could not query process state before terminating");
            }
        }

        if let Some(pid) = self.child.id() {
            info!(program = %self.label, pid, "sending graceful termination signal");
            send_graceful_signal(pid);

            match timeout(TERMINATE_GRACE, self.child.wait()).await {
                Ok(Ok(status)) => {
                    info!(program = %self.label, ?status, "process exited after termination signal");
                    return TerminateOutcome::Terminated;
                }
                Ok(Err(e)) => {
                    warn!(program = %self.label, error = %e, "waiting after termination signal failed");
                }
                Err(_) => {
                    warn!(
                        program = %self.label,
                        grace_secs = TERMINATE_GRACE.as_secs(),
                        "process did not exit after termination signal; escalating to kill"
                    );
                }
            }
        }

        if let Err(e) = self.child.start_kill() {
            warn!(program = %self.label, error = %e, "failed to send kill signal");
        }

        match timeout(TERMINATE_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => {
                info!(program = %self.label, ?status, "process killed");
                TerminateOutcome::Killed
            }
            Ok(Err(e)) => {
                error!(program = %self.label, error = %e, "waiting after kill signal failed");
                TerminateOutcome::Unresponsive
            }
            Err(_) => {
                error!(
                    program = %self.label,
                    grace_secs = TERMINATE_GRACE.as_secs(),
                    "process did not exit after kill signal"
                );
                TerminateOutcome::Unresponsive
            }
        }
    }

    /// Read everything the child prints and wait for it to exit.
    ///
    /// If `cancel` fires first the child is terminated and `None` is returned.
    pub async fn collect(mut self, cancel: &CancellationToken) -> io::Result<Option<CapturedOutput>> {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let finished = loop {
            let line = tokio::select! {
                line = self.lines.recv() => line,
                _ = cancel.cancelled() => break false,
            };
            match line {
                Some(OutputLine { stream: StreamKind::Stdout, text }) => stdout.push(text),
                Some(OutputLine { stream: StreamKind::Stderr, text }) => stderr.push(text),
                None => break true,
            }
        };

        let code = if finished {
            tokio::select! {
                code = self.child.wait() => Some(code?.code().unwrap_or(-1)),
                _ = cancel.cancelled() => None,
            }
        } else {
            None
        };

        let Some(code) = code else {
            self.terminate().await;
            return Ok(None);
        };

        debug!(program = %self.label, exit_code = code, "captured process exited");
        Ok(Some(CapturedOutput {
            code,
            stdout: stdout.join("\n"),
            stderr: stderr.join("\n"),
        }))
    }
}

/// Spawn a short-lived child and capture its whole output.
pub async fn run_captured(plan: &CommandPlan, cancel: &CancellationToken) -> io::Result<Option<CapturedOutput>> {
    SupervisedProcess::spawn(plan)?.collect(cancel).await
}

fn spawn_line_reader<R>(
    pipe: R,
    stream: StreamKind,
    tx: mpsc::Sender<OutputLine>,
    label: String,
)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        let mut forwarding = true;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(program = %label, ?stream, error = %e, "error reading child output; closing stream");
                    break;
                }
            }

            // Invalid UTF-8 must not end the stream.
            let text = String::from_utf8_lossy(&buf)
                .trim_end_matches(['\n', '\r'])
                .to_string();

            if forwarding {
                if tx.send(OutputLine { stream, text }).await.is_err() {
                    debug!(program = %label, ?stream, "line consumer gone; draining remaining output");
                    forwarding = false;
                }
            } else {
                debug!(program = %label, ?stream, "discarded: {}", text);
            }
        }

        debug!(program = %label, ?stream, "output stream closed");
    });
}

#[cfg(unix)]
fn send_graceful_signal(pid: u32) {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!(pid, "pid does not fit in i32; skipping termination signal");
        return;
    };
    if let Err(e) = signal::kill(Pid::from_raw(raw), Signal::SIGTERM) {
        warn!(pid, error = %e, "failed to send SIGTERM");
    }
}

#[cfg(not(unix))]
fn send_graceful_signal(pid: u32) {
    debug!(pid, "no graceful termination signal on this platform; will kill");
}
