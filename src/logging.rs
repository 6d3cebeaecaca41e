// src/logging.rs

//! Logging setup for `dlbot` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `DLBOT_LOG` environment variable, in `EnvFilter` syntax
//!    (e.g. "debug" or "dlbot=debug,reqwest=info")
//! 3. default to `info`
//!
//! Unless a directive names them, the HTTP client crates are capped at
//! `warn`; every long poll would otherwise log connection chatter.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Env var holding the filter directives.
pub const LOG_ENV: &str = "DLBOT_LOG";

const QUIET_DEPENDENCIES: [&str; 3] = ["hyper", "hyper_util", "reqwest"];

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let directives = filter_directives(cli_level, env.as_deref());
    let filter = EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("invalid log filter {directives:?}: {e}"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Directives for the `EnvFilter`, from the CLI level or the env value.
///
/// A blank env value counts as unset. A bare env level such as `WARNING`
/// is normalised; anything else is passed through as directives.
pub fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    let base = match (cli_level, env.map(str::trim).filter(|s| !s.is_empty())) {
        (Some(lvl), _) => level_name(lvl).to_string(),
        (None, Some(raw)) => parse_level_str(raw)
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
        (None, None) => "info".to_string(),
    };

    let mut directives = base;
    for dep in QUIET_DEPENDENCIES {
        let named = directives
            .split(',')
            .any(|d| d.trim().split(['=', '[']).next() == Some(dep));
        if !named {
            directives.push_str(&format!(",{dep}=warn"));
        }
    }
    directives
}

fn level_name(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

fn parse_level_str(s: &str) -> Option<&'static str> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}
