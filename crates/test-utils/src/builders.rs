#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dlbot::config::AppConfig;
use dlbot::context::AppContext;
use dlbot::transport::ChatTransport;

/// Builder for `AppConfig` to simplify test setup.
///
/// Defaults to a zero progress interval so every distinct progress text is
/// pushed, which keeps assertions deterministic.
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        let mut config = AppConfig::new("123456:TEST", download_dir);
        config.progress_interval = Duration::ZERO;
        Self { config }
    }

    pub fn engine(mut self, binary: impl AsRef<Path>) -> Self {
        self.config.engine_binary = binary.as_ref().to_path_buf();
        self
    }

    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cookie_file = Some(path.into());
        self
    }

    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.config.progress_interval = interval;
        self
    }

    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.config.download_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

/// Wrap a config and a transport into an `AppContext`.
pub fn test_context<T: ChatTransport + 'static>(config: AppConfig, transport: Arc<T>) -> AppContext {
    AppContext::new(config, transport)
}
