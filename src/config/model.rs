// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [bot]
/// token = "123456:ABC..."
/// poll_timeout_secs = 30
///
/// [engine]
/// binary = "yt-dlp"
/// download_dir = "/app/downloads"
/// cookie_file = "/app/cookies.txt"
/// timeout_secs = 3600
///
/// [progress]
/// min_interval_secs = 3
/// ```
///
/// All sections are optional; CLI flags and env vars are layered on top
/// before validation turns this into an [`AppConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub bot: BotSection,

    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub progress: ProgressSection,
}

/// `[bot]` section: chat platform connection.
#[derive(Debug, Clone, Deserialize)]
pub struct BotSection {
    /// Bot API token. Usually supplied via `DLBOT_BOT_TOKEN` instead.
    #[serde(default)]
    pub token: Option<String>,

    /// Base URL of the Bot API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Long-poll timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

impl Default for BotSection {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

/// `[engine]` section: the external download engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Engine executable, looked up on `PATH` if not absolute.
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// Root directory; each request gets its own subdirectory.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Netscape-format cookie file passed with `--cookies` when it exists.
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,

    /// Upper bound for one download; `None` means no limit.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_binary() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            download_dir: default_download_dir(),
            cookie_file: None,
            timeout_secs: None,
        }
    }
}

/// `[progress]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressSection {
    /// Minimum time between two status edits (completion edits bypass it).
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
}

fn default_min_interval_secs() -> u64 {
    3
}

impl Default for ProgressSection {
    fn default() -> Self {
        Self {
            min_interval_secs: default_min_interval_secs(),
        }
    }
}

/// Values supplied on the command line or through the environment.
///
/// `None` means "not given"; the file value (or default) is kept.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub token: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub cookie_file: Option<PathBuf>,
    pub engine_binary: Option<PathBuf>,
}

impl RawConfigFile {
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(token) = &overrides.token {
            self.bot.token = Some(token.clone());
        }
        if let Some(dir) = &overrides.download_dir {
            self.engine.download_dir = dir.clone();
        }
        if let Some(cookies) = &overrides.cookie_file {
            self.engine.cookie_file = Some(cookies.clone());
        }
        if let Some(binary) = &overrides.engine_binary {
            self.engine.binary = binary.clone();
        }
    }
}

/// Validated, immutable configuration shared by every component.
#[derive(Clone)]
pub struct AppConfig {
    pub bot_token: String,
    pub api_url: String,
    pub poll_timeout: Duration,
    pub engine_binary: PathBuf,
    pub download_dir: PathBuf,
    pub cookie_file: Option<PathBuf>,
    pub download_timeout: Option<Duration>,
    pub progress_interval: Duration,
}

impl AppConfig {
    /// Build a config directly, skipping file loading. Used by tests and
    /// embedders that already hold the values.
    pub fn new(bot_token: impl Into<String>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_url: default_api_url(),
            poll_timeout: Duration::from_secs(default_poll_timeout_secs()),
            engine_binary: default_binary(),
            download_dir: download_dir.into(),
            cookie_file: None,
            download_timeout: None,
            progress_interval: Duration::from_secs(default_min_interval_secs()),
        }
    }
}

// The token must never end up in logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .field("engine_binary", &self.engine_binary)
            .field("download_dir", &self.download_dir)
            .field("cookie_file", &self.cookie_file)
            .field("download_timeout", &self.download_timeout)
            .field("progress_interval", &self.progress_interval)
            .finish()
    }
}
