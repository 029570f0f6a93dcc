use serde::{Deserialize, Serialize};

use inkdash_common::constants::{DEFAULT_CHAIN_NAME, DEFAULT_CHAIN_SLUG, LLAMA_API_BASE};
use inkdash_common::error::{InkError, InkResult};
use inkdash_common::types::TargetChain;

use crate::pct::PctGuard;

// ═══════════════════════════════════════════════════════════════════════
//  APP CONFIG: top-level, stored at ~/.inkdash/config.toml
// ═══════════════════════════════════════════════════════════════════════

/// Top-level configuration stored in `$HOME/.inkdash/config.toml`.
///
/// ```toml
/// [system]
/// verbose = false
///
/// [chain]
/// name = "Ink"
/// slug = "ink"
///
/// [upstream]
/// base_url = "https://api.llama.fi"
/// timeout_secs = 15
/// max_in_flight = 16
///
/// [rankings]
/// enrich_concurrency = 8
/// # top_n = 25
///
/// [thresholds]
/// min_baseline = 1000.0
/// max_abs_pct = 100000.0
///
/// [server]
/// bind = "0.0.0.0:3001"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub rankings: RankingsConfig,
    /// Guard rails for TVL change percentages.
    #[serde(default)]
    pub thresholds: PctGuard,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Raise the default log filter to `debug` when `RUST_LOG` is unset.
    #[serde(default)]
    pub verbose: bool,
}

// ═══════════════════════════════════════════════════════════════════════
//  CHAIN
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Display name as it appears in upstream `chains` lists.
    #[serde(default = "default_chain_name")]
    pub name: String,
    /// Slug used in upstream URL paths.
    #[serde(default = "default_chain_slug")]
    pub slug: String,
}

impl ChainConfig {
    pub fn target(&self) -> TargetChain {
        TargetChain::new(self.name.trim(), self.slug.trim())
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: default_chain_name(),
            slug: default_chain_slug(),
        }
    }
}

fn default_chain_name() -> String {
    DEFAULT_CHAIN_NAME.into()
}
fn default_chain_slug() -> String {
    DEFAULT_CHAIN_SLUG.into()
}

// ═══════════════════════════════════════════════════════════════════════
//  UPSTREAM
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Cap on concurrent requests to the aggregation API.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

fn default_base_url() -> String {
    LLAMA_API_BASE.into()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_max_in_flight() -> usize {
    16
}

// ═══════════════════════════════════════════════════════════════════════
//  RANKINGS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingsConfig {
    /// Protocols enriched at the same time.
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,
    /// Keep only the top N protocols by chain TVL. Unset keeps all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

impl Default for RankingsConfig {
    fn default() -> Self {
        Self {
            enrich_concurrency: default_enrich_concurrency(),
            top_n: None,
        }
    }
}

fn default_enrich_concurrency() -> usize {
    8
}

// ═══════════════════════════════════════════════════════════════════════
//  SERVER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3001".into()
}

// ═══════════════════════════════════════════════════════════════════════
//  LOADING / VALIDATION
// ═══════════════════════════════════════════════════════════════════════

/// Environment variables that override file settings.
pub const ENV_UPSTREAM_URL: &str = "INKDASH_UPSTREAM_URL";
pub const ENV_BIND: &str = "INKDASH_BIND";
pub const ENV_CHAIN_NAME: &str = "INKDASH_CHAIN_NAME";
pub const ENV_CHAIN_SLUG: &str = "INKDASH_CHAIN_SLUG";

impl AppConfig {
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty(ENV_UPSTREAM_URL) {
            self.upstream.base_url = v;
        }
        if let Some(v) = non_empty(ENV_BIND) {
            self.server.bind = v;
        }
        if let Some(v) = non_empty(ENV_CHAIN_NAME) {
            self.chain.name = v;
        }
        if let Some(v) = non_empty(ENV_CHAIN_SLUG) {
            self.chain.slug = v;
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|k| std::env::var(k).ok());
    }

    pub fn validate(&self) -> InkResult<()> {
        if self.chain.name.trim().is_empty() || self.chain.slug.trim().is_empty() {
            return Err(InkError::InvalidConfig("chain name and slug must be set".into()));
        }
        if self.upstream.base_url.trim().is_empty() {
            return Err(InkError::InvalidConfig("upstream.base_url must be set".into()));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(InkError::InvalidConfig("upstream.timeout_secs must be > 0".into()));
        }
        if self.upstream.max_in_flight == 0 || self.rankings.enrich_concurrency == 0 {
            return Err(InkError::InvalidConfig(
                "upstream.max_in_flight and rankings.enrich_concurrency must be > 0".into(),
            ));
        }
        let t = &self.thresholds;
        if !t.min_baseline.is_finite() || !t.max_abs_pct.is_finite() || t.min_baseline < 0.0 || t.max_abs_pct < 0.0 {
            return Err(InkError::InvalidConfig(
                "thresholds must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}
