//! Row and snapshot types shared by the core pipeline, the CLI and the backend.
//!
//! Everything here is built fresh per request from live upstream data and
//! never mutated after construction.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHAIN_NAME, DEFAULT_CHAIN_SLUG};

/// The chain being tracked, identified both by display name and slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetChain {
    /// Display name, e.g. `"Ink"`.
    pub name: String,
    /// Lowercase slug, e.g. `"ink"`.
    pub slug: String,
}

impl TargetChain {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into().to_lowercase(),
        }
    }

    /// Case-insensitive match against either the display name or the slug.
    pub fn matches(&self, candidate: &str) -> bool {
        let c = candidate.trim().to_lowercase();
        c == self.slug || c == self.name.to_lowercase()
    }
}

impl Default for TargetChain {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_NAME, DEFAULT_CHAIN_SLUG)
    }
}

impl std::fmt::Display for TargetChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One protocol's display-ready metrics, scoped to the target chain.
///
/// Every numeric field is either a finite number or `None` (serialized as
/// `null`). Percentages are already guarded against tiny baselines and
/// outliers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolRow {
    pub name: String,
    pub slug: String,
    pub category: String,
    pub tvl: Option<f64>,

    pub change_1d_pct: Option<f64>,
    pub change_7d_pct: Option<f64>,
    pub change_1m_pct: Option<f64>,

    pub fees_24h: Option<f64>,
    pub fees_7d: Option<f64>,
    pub fees_30d: Option<f64>,
    pub fees_1y: Option<f64>,

    pub spot_volume_24h: Option<f64>,
    pub spot_volume_7d: Option<f64>,
    pub spot_change_7d: Option<f64>,
    pub spot_cumulative_volume: Option<f64>,

    /// The protocol lists the target chain as its only chain, so its
    /// whole-protocol totals may stand in for chain-scoped figures.
    #[serde(rename = "isInkOnly")]
    pub is_ink_only: bool,
}

impl ProtocolRow {
    /// True when at least one TVL change percentage is still unknown.
    pub fn missing_changes(&self) -> bool {
        self.change_1d_pct.is_none() || self.change_7d_pct.is_none() || self.change_1m_pct.is_none()
    }
}

/// Bookkeeping counters returned alongside the ranking rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingCounts {
    /// Protocols in the bulk listing.
    pub all_protocols: usize,
    /// Protocols that survived the chain filter.
    pub base_rows: usize,
    /// Rows that went through enrichment.
    pub enriched: usize,
}

/// Successful `/api/protocol-rankings` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingsReport {
    pub ok: bool,
    pub chain: String,
    pub counts: RankingCounts,
    pub rows: Vec<ProtocolRow>,
    /// Bulk listing URL.
    pub source: String,
    /// Milliseconds since epoch.
    pub ts: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSource {
    pub chains_url: String,
    pub hist_url: String,
}

/// Successful `/api/tvl` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTvlSnapshot {
    pub ok: bool,
    pub chain: String,
    pub tvl: Option<f64>,
    pub tvl_change_24h_pct: Option<f64>,
    pub source: SnapshotSource,
    pub ts: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_chain_matches_any_case() {
        let chain = TargetChain::default();
        assert!(chain.matches("Ink"));
        assert!(chain.matches("INK"));
        assert!(chain.matches(" ink "));
        assert!(!chain.matches("Base"));
    }

    #[test]
    fn test_target_chain_slug_lowercased() {
        let chain = TargetChain::new("Ink", "INK");
        assert_eq!(chain.slug, "ink");
    }

    #[test]
    fn test_row_serializes_ink_only_flag() {
        let row = ProtocolRow {
            name: "Foo".into(),
            slug: "foo".into(),
            is_ink_only: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["isInkOnly"], true);
        assert!(json["tvl"].is_null());
        assert!(json.get("is_ink_only").is_none());
    }

    #[test]
    fn test_counts_camel_case() {
        let counts = RankingCounts { all_protocols: 3, base_rows: 2, enriched: 2 };
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["allProtocols"], 3);
        assert_eq!(json["baseRows"], 2);
    }

    #[test]
    fn test_missing_changes() {
        let mut row = ProtocolRow {
            change_1d_pct: Some(1.0),
            change_7d_pct: Some(2.0),
            change_1m_pct: Some(3.0),
            ..Default::default()
        };
        assert!(!row.missing_changes());
        row.change_7d_pct = None;
        assert!(row.missing_changes());
    }
}
