// src/lib.rs

pub mod bot;
pub mod cli;
pub mod config;
pub mod context;
pub mod download;
pub mod errors;
pub mod exec;
pub mod handler;
pub mod logging;
pub mod progress;
pub mod transport;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bot::Dispatcher;
use crate::cli::CliArgs;
use crate::config::{AppConfig, load_and_validate};
use crate::context::AppContext;
use crate::errors::Result;
use crate::transport::{TelegramTransport, TelegramUpdates};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file, env, CLI)
/// - the Bot API transport and long-poll source
/// - the dispatcher and its request tasks
/// - Ctrl-C / SIGTERM handling
///
/// Startup failures come back as [`errors::BotError`]: config problems as
/// `ConfigError`/`IoError`/`TomlError`, a client that cannot be built as
/// `Transport`, anything else with context attached as `Other`.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(args.config.as_deref(), &args.overrides())?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    tokio::fs::create_dir_all(&cfg.download_dir)
        .await
        .with_context(|| format!("creating download directory {}", cfg.download_dir.display()))?;

    let transport = TelegramTransport::from_config(&cfg)?;
    let source = TelegramUpdates::new(transport.clone(), cfg.poll_timeout);

    info!(
        engine = %cfg.engine_binary.display(),
        download_dir = %cfg.download_dir.display(),
        cookies = cfg.cookie_file.is_some(),
        "bot starting"
    );

    let ctx = Arc::new(AppContext::new(cfg, Arc::new(transport)));
    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    Dispatcher::new(ctx, source, shutdown).run().await?;
    Ok(())
}

/// Cancel `shutdown` on Ctrl-C, or SIGTERM on unix.
fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("shutdown signal received");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGTERM; only Ctrl-C will stop the bot");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            return;
        }
    };

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!(error = %e, "failed to listen for Ctrl-C");
                term.recv().await;
            }
        }
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Simple dry-run output: print the effective config with the token hidden.
fn print_dry_run(cfg: &AppConfig) {
    println!("dlbot dry-run");
    println!("  bot.api_url           = {}", cfg.api_url);
    println!("  bot.token             = <redacted>");
    println!("  bot.poll_timeout      = {}s", cfg.poll_timeout.as_secs());
    println!("  engine.binary         = {}", cfg.engine_binary.display());
    println!("  engine.download_dir   = {}", cfg.download_dir.display());
    match &cfg.cookie_file {
        Some(path) => {
            let note = if path.is_file() { "" } else { " (missing; will be skipped)" };
            println!("  engine.cookie_file    = {}{note}", path.display());
        }
        None => println!("  engine.cookie_file    = <none>"),
    }
    match cfg.download_timeout {
        Some(t) => println!("  engine.timeout        = {}s", t.as_secs()),
        None => println!("  engine.timeout        = <none>"),
    }
    println!("  progress.min_interval = {}s", cfg.progress_interval.as_secs());

    debug!("dry-run complete (no connection)");
}
