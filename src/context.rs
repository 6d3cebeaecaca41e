// src/context.rs

use std::sync::Arc;

use crate::config::AppConfig;
use crate::download::BypassStrategy;
use crate::transport::ChatTransport;

/// Everything a request needs, built once at startup and shared by handle.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub transport: Arc<dyn ChatTransport>,
    pub bypass: Option<Arc<dyn BypassStrategy>>,
}

impl AppContext {
    pub fn new(config: AppConfig, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            config,
            transport,
            bypass: None,
        }
    }

    pub fn with_bypass(mut self, strategy: Arc<dyn BypassStrategy>) -> Self {
        self.bypass = Some(strategy);
        self
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("bypass", &self.bypass.as_ref().map(|b| b.name().to_string()))
            .finish_non_exhaustive()
    }
}
