//! Shared application state for the API server.

use std::sync::Arc;

use inkdash_common::traits::Upstream;
use inkdash_common::types::TargetChain;
use inkdash_core::config::AppConfig;
use inkdash_core::LlamaClient;

/// Backend application state, shared across all request handlers.
pub struct AppState {
    pub config: AppConfig,
    pub upstream: Arc<dyn Upstream>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let upstream = Arc::new(LlamaClient::new(&config.upstream)?);
        Ok(Self::with_upstream(config, upstream))
    }

    pub fn with_upstream(config: AppConfig, upstream: Arc<dyn Upstream>) -> Self {
        Self { config, upstream }
    }

    pub fn chain(&self) -> TargetChain {
        self.config.chain.target()
    }
}
