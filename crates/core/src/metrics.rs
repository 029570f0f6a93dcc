//! Key metrics panel built from the chain snapshot.

use serde::Serialize;

use inkdash_common::types::ChainTvlSnapshot;

use crate::fmt::{format_pct_fixed, format_short, or_placeholder};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDetail {
    pub label: String,
    pub value_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRow {
    pub id: String,
    pub label: String,
    pub value_text: String,
    pub has_dropdown: bool,
    pub details: Vec<MetricDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyMetrics {
    pub chain: String,
    pub metrics: Vec<MetricRow>,
}

pub fn tvl_metric(snapshot: &ChainTvlSnapshot) -> MetricRow {
    MetricRow {
        id: "tvl".into(),
        label: "Total Value Locked in DeFi".into(),
        value_text: or_placeholder(snapshot.tvl, format_short),
        has_dropdown: true,
        details: vec![MetricDetail {
            label: "Change (24h)".into(),
            value_text: or_placeholder(snapshot.tvl_change_24h_pct, format_pct_fixed),
        }],
    }
}

pub fn key_metrics(snapshot: &ChainTvlSnapshot) -> KeyMetrics {
    KeyMetrics {
        chain: snapshot.chain.clone(),
        metrics: vec![tvl_metric(snapshot)],
    }
}
