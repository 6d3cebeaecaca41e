// tests/startup.rs

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use dlbot::cli::CliArgs;
use dlbot::errors::{BotError, TransportError};

type TestResult = Result<(), Box<dyn Error>>;

fn args(config: PathBuf) -> CliArgs {
    CliArgs {
        config: Some(config),
        token: None,
        download_dir: None,
        cookies: None,
        engine: None,
        log_level: None,
        dry_run: true,
    }
}

#[tokio::test]
async fn dry_run_validates_without_connecting() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(file, "[bot]\ntoken = \"1:abc\"\napi_url = \"http://127.0.0.1:9\"\n")?;

    dlbot::run(args(file.path().to_path_buf())).await?;
    Ok(())
}

#[tokio::test]
async fn unreadable_config_stops_startup_with_io_error() {
    let result = dlbot::run(args(PathBuf::from("/definitely/not/here/dlbot.toml"))).await;
    assert!(matches!(result, Err(BotError::IoError(_))));
}

#[test]
fn transport_failures_keep_their_cause() {
    let err = BotError::from(TransportError::Api {
        method: "getMe".to_string(),
        description: "Unauthorized".to_string(),
    });
    assert!(matches!(err, BotError::Transport(_)));
    assert_eq!(err.to_string(), "Transport error: API rejected getMe: Unauthorized");
}

#[test]
fn contextual_errors_surface_as_other() {
    let err = BotError::from(anyhow::anyhow!("creating download directory /x"));
    assert!(matches!(err, BotError::Other(_)));
    assert_eq!(err.to_string(), "creating download directory /x");
}
