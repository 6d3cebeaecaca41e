// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag that maps onto a config value can also be set through the
//! environment (clap `env` feature). Values given here win over the TOML file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigOverrides;

/// Command-line arguments for `dlbot`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dlbot",
    version,
    about = "Chat bot that downloads media with yt-dlp and uploads the result.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `dlbot.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Bot API token.
    #[arg(long, env = "DLBOT_BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Root directory for downloads.
    #[arg(long, env = "DOWNLOAD_DIR", value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Cookie file handed to the engine with `--cookies`.
    #[arg(long, env = "COOKIES_FILE", value_name = "PATH")]
    pub cookies: Option<PathBuf>,

    /// Download engine executable.
    #[arg(long, value_name = "PATH")]
    pub engine: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DLBOT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate config, print it, but don't connect to the chat API.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Config values given on the command line or in the environment.
    ///
    /// `BOT_TOKEN` is accepted as a fallback for deployments that used the
    /// unprefixed name.
    pub fn overrides(&self) -> ConfigOverrides {
        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("BOT_TOKEN").ok())
            .filter(|t| !t.trim().is_empty());

        ConfigOverrides {
            token,
            download_dir: self.download_dir.clone(),
            cookie_file: self.cookies.clone(),
            engine_binary: self.engine.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
