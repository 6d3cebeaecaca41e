// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{AppConfig, RawConfigFile};
use crate::errors::{BotError, Result};

impl TryFrom<RawConfigFile> for AppConfig {
    type Error = BotError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;

        let bot_token = raw
            .bot
            .token
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        Ok(AppConfig {
            bot_token,
            api_url: raw.bot.api_url.trim_end_matches('/').to_string(),
            poll_timeout: Duration::from_secs(raw.bot.poll_timeout_secs),
            engine_binary: raw.engine.binary,
            download_dir: raw.engine.download_dir,
            cookie_file: raw.engine.cookie_file,
            download_timeout: raw.engine.timeout_secs.map(Duration::from_secs),
            progress_interval: Duration::from_secs(raw.progress.min_interval_secs),
        })
    }
}

/// Check the semantic invariants of a (merged) raw config.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_bot(cfg)?;
    validate_engine(cfg)?;
    validate_progress(cfg)?;
    Ok(())
}

fn validate_bot(cfg: &RawConfigFile) -> Result<()> {
    let has_token = cfg
        .bot
        .token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if !has_token {
        return Err(BotError::ConfigError(
            "bot token is required ([bot].token, --token or DLBOT_BOT_TOKEN)".to_string(),
        ));
    }

    if cfg.bot.api_url.trim().is_empty() {
        return Err(BotError::ConfigError(
            "[bot].api_url must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    if cfg.engine.binary.as_os_str().is_empty() {
        return Err(BotError::ConfigError(
            "[engine].binary must not be empty".to_string(),
        ));
    }

    if cfg.engine.download_dir.as_os_str().is_empty() {
        return Err(BotError::ConfigError(
            "[engine].download_dir must not be empty".to_string(),
        ));
    }

    if cfg.engine.timeout_secs == Some(0) {
        return Err(BotError::ConfigError(
            "[engine].timeout_secs must be >= 1 when set (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_progress(cfg: &RawConfigFile) -> Result<()> {
    if cfg.progress.min_interval_secs == 0 {
        return Err(BotError::ConfigError(
            "[progress].min_interval_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
