//! Upstream factory: the live DefiLlama client, or a recorded fixture.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use inkdash_common::traits::Upstream;
use inkdash_core::config::AppConfig;
use inkdash_core::{LlamaClient, StaticUpstream};

/// What every data command needs: the effective config and an upstream.
pub struct Context {
    pub config: AppConfig,
    pub upstream: Arc<dyn Upstream>,
}

impl Context {
    pub fn new(config: AppConfig, fixture: Option<&Path>) -> Result<Self> {
        let upstream: Arc<dyn Upstream> = match fixture {
            Some(path) => {
                info!(fixture = %path.display(), "replaying recorded upstream");
                Arc::new(StaticUpstream::from_fixture_file(&config.upstream.base_url, path)?)
            }
            None => Arc::new(LlamaClient::new(&config.upstream)?),
        };
        Ok(Self { config, upstream })
    }
}
