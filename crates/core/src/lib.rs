//! inkdash core: DefiLlama normalization pipeline, formatting and config.

// ── Configuration ──
pub mod config;
pub mod workspace;

// ── Upstream access ──
pub mod client;
pub mod fixture;

// ── Normalization ──
pub mod json;
pub mod pct;
pub mod series;
pub mod rankings;
pub mod snapshot;
pub mod probe;

// ── Presentation ──
pub mod columns;
pub mod fmt;
pub mod metrics;
pub mod output;

pub use client::LlamaClient;
pub use fixture::StaticUpstream;
pub use rankings::{build_rankings, RankingsOptions};
pub use snapshot::build_snapshot;
pub use workspace::{init_workspace, load_config};
