//! Shared constants for inkdash.

/// Target chain display name, as DefiLlama spells it in `chains`.
pub const DEFAULT_CHAIN_NAME: &str = "Ink";

/// Target chain slug, as used in DefiLlama URL paths.
pub const DEFAULT_CHAIN_SLUG: &str = "ink";

/// DefiLlama public API.
pub const LLAMA_API_BASE: &str = "https://api.llama.fi";

/// Guarded percentage: baselines below this are treated as unknown.
pub const DEFAULT_MIN_BASELINE: f64 = 1000.0;

/// Guarded percentage: results with a larger magnitude are treated as unknown.
pub const DEFAULT_MAX_ABS_PCT: f64 = 100_000.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Categories whose protocols get a spot-volume lookup (compared lowercased).
pub const DEX_CATEGORIES: &[&str] = &["dexs", "dex"];

/// Placeholder rendered in the key metrics panel for unknown values.
pub const PLACEHOLDER: &str = "—";
