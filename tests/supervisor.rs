// tests/supervisor.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use dlbot::exec::{CommandPlan, StreamKind, SupervisedProcess, TerminateOutcome, run_captured};
use tokio_util::sync::CancellationToken;

type TestResult = Result<(), Box<dyn Error>>;

fn sh(script: &str) -> CommandPlan {
    CommandPlan {
        program: PathBuf::from("/bin/sh"),
        args: vec!["-c".to_string(), script.to_string()],
        warnings: Vec::new(),
    }
}

#[tokio::test]
async fn lines_from_both_pipes_are_delivered_in_order_per_stream() -> TestResult {
    init_tracing();
    let mut process = SupervisedProcess::spawn(&sh("echo one; echo two; echo oops >&2; echo three"))?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    while let Some(line) = with_timeout(process.next_line()).await {
        match line.stream {
            StreamKind::Stdout => stdout.push(line.text),
            StreamKind::Stderr => stderr.push(line.text),
        }
    }

    assert_eq!(stdout, vec!["one", "two", "three"]);
    assert_eq!(stderr, vec!["oops"]);
    assert_eq!(process.wait().await?, 0);
    Ok(())
}

#[tokio::test]
async fn invalid_utf8_does_not_end_the_stream() -> TestResult {
    init_tracing();
    let mut process = SupervisedProcess::spawn(&sh(r"printf 'bad \377 byte\nafter\n'"))?;

    let mut lines = Vec::new();
    while let Some(line) = with_timeout(process.next_line()).await {
        lines.push(line.text);
    }
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("bad "));
    assert_eq!(lines[1], "after");
    Ok(())
}

#[tokio::test]
async fn exit_code_is_reported() -> TestResult {
    init_tracing();
    let output = run_captured(&sh("echo out; echo err >&2; exit 3"), &CancellationToken::new())
        .await?
        .expect("not cancelled");
    assert_eq!(output.code, 3);
    assert_eq!(output.stdout, "out");
    assert_eq!(output.stderr, "err");
    Ok(())
}

#[tokio::test]
async fn spawn_failure_is_an_io_error() {
    init_tracing();
    let plan = CommandPlan {
        program: PathBuf::from("/nonexistent/engine"),
        args: Vec::new(),
        warnings: Vec::new(),
    };
    assert!(SupervisedProcess::spawn(&plan).is_err());
}

#[tokio::test]
async fn terminate_stops_a_sleeping_child_with_sigterm() -> TestResult {
    init_tracing();
    let mut process = SupervisedProcess::spawn(&sh("exec sleep 30"))?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let outcome = with_timeout(process.terminate()).await;
    assert_eq!(outcome, TerminateOutcome::Terminated);
    Ok(())
}

#[tokio::test]
async fn terminate_escalates_when_sigterm_is_ignored() -> TestResult {
    init_tracing();
    let mut process = SupervisedProcess::spawn(&sh("trap '' TERM; echo ready; while :; do sleep 1; done"))?;
    // Wait until the trap is installed.
    let first = with_timeout(process.next_line()).await.expect("ready line");
    assert_eq!(first.text, "ready");

    let outcome = with_timeout(process.terminate()).await;
    assert_eq!(outcome, TerminateOutcome::Killed);
    Ok(())
}

#[tokio::test]
async fn terminate_after_exit_is_a_no_op() -> TestResult {
    init_tracing();
    let mut process = SupervisedProcess::spawn(&sh("true"))?;
    process.wait().await?;
    assert_eq!(process.terminate().await, TerminateOutcome::AlreadyExited);
    Ok(())
}

#[tokio::test]
async fn cancelled_capture_terminates_child() -> TestResult {
    init_tracing();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let output = with_timeout(run_captured(&sh("exec sleep 30"), &cancel)).await?;
    assert!(output.is_none());
    Ok(())
}
