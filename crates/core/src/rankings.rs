//! Protocol rankings for the target chain.
//!
//! Pipeline: bulk `/protocols` listing → chain filter → base rows with
//! chain-scoped TVL and guarded changes → rank by TVL → per-protocol
//! enrichment (TVL history backfill, fees, spot volume) through a bounded
//! ordered stream.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use inkdash_common::constants::DEX_CATEGORIES;
use inkdash_common::error::{InkError, InkResult};
use inkdash_common::traits::Upstream;
use inkdash_common::types::{ProtocolRow, RankingCounts, RankingsReport, TargetChain};

use crate::client::Endpoints;
use crate::config::AppConfig;
use crate::json::{num_from_any, pick_breakdown, pick_chain, str_field, to_num};
use crate::pct::PctGuard;
use crate::series::{
    extract_series_values, last_value, sum_all, sum_last, tvl_at_days_ago,
    tvl_series_from_chain, weekly_change_from_daily, TVL_POINT_KEYS,
};

// ── Synonyms ────────────────────────────────────────────────────────

pub const FEES_BREAKDOWN_KEYS: &[&str] =
    &["totalDataChartBreakdown", "totalFeesChartBreakdown", "feesChartBreakdown"];
pub const VOLUME_BREAKDOWN_KEYS: &[&str] =
    &["totalDataChartBreakdown", "totalVolumeChartBreakdown", "volumeChartBreakdown"];

/// The bare `total`/`fees` keys are last-resort synonyms for the daily figure.
pub const FEES_24H_KEYS: &[&str] = &["total24h", "fees24h", "totalFees24h", "total", "fees"];
pub const FEES_7D_KEYS: &[&str] = &["total7d", "fees7d", "totalFees7d"];
pub const FEES_30D_KEYS: &[&str] = &["total30d", "fees30d", "totalFees30d"];
pub const FEES_1Y_KEYS: &[&str] = &["total1y", "fees1y", "totalFees1y"];

pub const VOLUME_24H_KEYS: &[&str] = &["total24h", "totalVolume24h", "volume24h"];
pub const VOLUME_7D_KEYS: &[&str] = &["total7d", "totalVolume7d", "volume7d"];
pub const VOLUME_ALL_TIME_KEYS: &[&str] = &["totalAllTime", "cumulativeVolume", "totalVolumeAllTime"];
pub const VOLUME_CHANGE_7D_KEYS: &[&str] = &["change_7d", "weeklyChange", "weekly_change_pct"];

// ── Options ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RankingsOptions {
    pub chain: TargetChain,
    pub guard: PctGuard,
    pub enrich_concurrency: usize,
    pub top_n: Option<usize>,
}

impl Default for RankingsOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for RankingsOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            chain: config.chain.target(),
            guard: config.thresholds,
            enrich_concurrency: config.rankings.enrich_concurrency,
            top_n: config.rankings.top_n,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  BASE ROWS
// ═══════════════════════════════════════════════════════════════════════

/// Does the record list the chain, either in `chains` or as a `chainTvls` key?
pub fn lists_chain(record: &Value, chain: &TargetChain) -> bool {
    let in_chains = record
        .get("chains")
        .and_then(Value::as_array)
        .is_some_and(|chains| chains.iter().filter_map(Value::as_str).any(|c| chain.matches(c)));

    in_chains
        || record
            .get("chainTvls")
            .and_then(Value::as_object)
            .is_some_and(|tvls| tvls.keys().any(|k| chain.matches(k)))
}

/// True when the target chain is the protocol's only listed chain.
pub fn is_chain_exclusive(record: &Value, chain: &TargetChain) -> bool {
    match record.get("chains").and_then(Value::as_array) {
        Some(chains) if chains.len() == 1 => chains[0].as_str().is_some_and(|c| chain.matches(c)),
        _ => false,
    }
}

/// Current TVL of a `chainTvls` entry: a bare number, `tvl` as a number,
/// or the last valid point of a nested `tvl` series.
fn entry_tvl(entry: &Value) -> Option<f64> {
    match entry {
        Value::Object(_) => match entry.get("tvl")? {
            Value::Array(points) => points.iter().rev().find_map(|p| match p {
                Value::Array(pair) => pair.last().and_then(to_num),
                Value::Object(_) => num_from_any(p, TVL_POINT_KEYS),
                other => to_num(other),
            }),
            tvl => to_num(tvl),
        },
        other => to_num(other),
    }
}

/// Build the pre-enrichment row for one protocol record.
///
/// Returns `None` for records without a usable name or slug.
pub fn base_row(record: &Value, chain: &TargetChain, guard: &PctGuard) -> Option<ProtocolRow> {
    let slug = str_field(record, "slug");
    let name = match str_field(record, "name") {
        n if n.is_empty() => slug.clone(),
        n => n,
    };
    if name.is_empty() || slug.is_empty() {
        return None;
    }

    let exclusive = is_chain_exclusive(record, chain);
    let entry = record.get("chainTvls").and_then(|t| pick_chain(t, chain));
    let from_entry = |key: &str| entry.and_then(|e| e.get(key)).and_then(to_num);
    let scoped = |chain_value: Option<f64>, key: &str| {
        chain_value.or_else(|| record.get(key).and_then(to_num).filter(|_| exclusive))
    };

    let tvl = scoped(entry.and_then(entry_tvl), "tvl");
    let prev_day = scoped(from_entry("tvlPrevDay"), "tvlPrevDay");
    let prev_week = scoped(from_entry("tvlPrevWeek"), "tvlPrevWeek");
    let prev_month = scoped(from_entry("tvlPrevMonth"), "tvlPrevMonth");

    Some(ProtocolRow {
        name,
        slug,
        category: str_field(record, "category"),
        tvl,
        change_1d_pct: guard.apply(tvl, prev_day),
        change_7d_pct: guard.apply(tvl, prev_week),
        change_1m_pct: guard.apply(tvl, prev_month),
        is_ink_only: exclusive,
        ..Default::default()
    })
}

/// Descending TVL, unknown as zero. Stable, so ties keep listing order.
pub fn rank_rows(rows: &mut [ProtocolRow]) {
    rows.sort_by(|a, b| b.tvl.unwrap_or(0.0).total_cmp(&a.tvl.unwrap_or(0.0)));
}

// ═══════════════════════════════════════════════════════════════════════
//  ENRICHMENT
// ═══════════════════════════════════════════════════════════════════════

/// Chain-scoped series out of a summary payload's breakdown object.
///
/// The chain entry must itself be a series. An entry keyed by sub-protocol
/// has no chain-level series and yields nothing.
fn chain_breakdown_values(summary: &Value, keys: &[&str], chain: &TargetChain) -> Vec<f64> {
    pick_breakdown(summary, keys)
        .and_then(|b| pick_chain(b, chain))
        .map(extract_series_values)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeeFigures {
    pub fees_24h: Option<f64>,
    pub fees_7d: Option<f64>,
    pub fees_30d: Option<f64>,
    pub fees_1y: Option<f64>,
}

pub fn fee_figures(summary: &Value, chain: &TargetChain, exclusive: bool) -> FeeFigures {
    let values = chain_breakdown_values(summary, FEES_BREAKDOWN_KEYS, chain);
    let total = |keys: &[&str]| num_from_any(summary, keys).filter(|_| exclusive);

    FeeFigures {
        fees_24h: last_value(&values).or_else(|| total(FEES_24H_KEYS)),
        fees_7d: sum_last(&values, 7).or_else(|| total(FEES_7D_KEYS)),
        fees_30d: sum_last(&values, 30).or_else(|| total(FEES_30D_KEYS)),
        fees_1y: sum_last(&values, 365).or_else(|| total(FEES_1Y_KEYS)),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VolumeFigures {
    pub spot_volume_24h: Option<f64>,
    pub spot_volume_7d: Option<f64>,
    pub spot_change_7d: Option<f64>,
    pub spot_cumulative_volume: Option<f64>,
}

pub fn volume_figures(summary: &Value, chain: &TargetChain, exclusive: bool) -> VolumeFigures {
    let values = chain_breakdown_values(summary, VOLUME_BREAKDOWN_KEYS, chain);
    let total = |keys: &[&str]| num_from_any(summary, keys).filter(|_| exclusive);

    VolumeFigures {
        spot_volume_24h: last_value(&values).or_else(|| total(VOLUME_24H_KEYS)),
        spot_volume_7d: sum_last(&values, 7).or_else(|| total(VOLUME_7D_KEYS)),
        spot_change_7d: weekly_change_from_daily(&values)
            .or_else(|| total(VOLUME_CHANGE_7D_KEYS).filter(|v| *v != 0.0)),
        spot_cumulative_volume: sum_all(&values).or_else(|| total(VOLUME_ALL_TIME_KEYS)),
    }
}

/// Fill in unknown change percentages from the chain-scoped TVL history
/// of a `/protocol/{slug}` detail payload. Known values are left alone.
pub fn backfill_changes(row: &mut ProtocolRow, detail: &Value, chain: &TargetChain, guard: &PctGuard) {
    let series = tvl_series_from_chain(detail, chain);
    let Some(now) = series.last().map(|p| p.value) else {
        return;
    };
    for (slot, days) in [
        (&mut row.change_1d_pct, 1),
        (&mut row.change_7d_pct, 7),
        (&mut row.change_1m_pct, 30),
    ] {
        if slot.is_none() {
            *slot = guard.apply(Some(now), tvl_at_days_ago(&series, days));
        }
    }
}

pub fn is_dex_category(category: &str) -> bool {
    DEX_CATEGORIES.contains(&category.trim().to_lowercase().as_str())
}

/// GET a sub-resource. Every failure mode collapses to `None`.
async fn fetch_payload(upstream: &dyn Upstream, url: &str) -> Option<Value> {
    match upstream.fetch(url).await {
        Ok(fetched) => match fetched.success_json() {
            Some(json) => Some(json.clone()),
            None => {
                debug!(url, status = fetched.status, "enrichment payload unusable");
                None
            }
        },
        Err(e) => {
            debug!(url, error = %e, "enrichment fetch failed");
            None
        }
    }
}

async fn enrich_row(
    upstream: &dyn Upstream,
    endpoints: &Endpoints,
    opts: &RankingsOptions,
    mut row: ProtocolRow,
) -> ProtocolRow {
    let detail_url = row.missing_changes().then(|| endpoints.protocol(&row.slug));
    let fees_url = endpoints.fees_summary(&row.slug);
    let dexs_url = is_dex_category(&row.category).then(|| endpoints.dexs_summary(&row.slug));

    let optional = |url: Option<String>| async move {
        match url {
            Some(url) => fetch_payload(upstream, &url).await,
            None => None,
        }
    };

    let (detail, fees, dexs) = futures::join!(
        optional(detail_url),
        fetch_payload(upstream, &fees_url),
        optional(dexs_url),
    );

    if let Some(detail) = detail {
        backfill_changes(&mut row, &detail, &opts.chain, &opts.guard);
    }
    if let Some(fees) = fees {
        let f = fee_figures(&fees, &opts.chain, row.is_ink_only);
        row.fees_24h = f.fees_24h;
        row.fees_7d = f.fees_7d;
        row.fees_30d = f.fees_30d;
        row.fees_1y = f.fees_1y;
    }
    if let Some(dexs) = dexs {
        let v = volume_figures(&dexs, &opts.chain, row.is_ink_only);
        row.spot_volume_24h = v.spot_volume_24h;
        row.spot_volume_7d = v.spot_volume_7d;
        row.spot_change_7d = v.spot_change_7d;
        row.spot_cumulative_volume = v.spot_cumulative_volume;
    }
    row
}

// ═══════════════════════════════════════════════════════════════════════
//  PIPELINE
// ═══════════════════════════════════════════════════════════════════════

/// Build the full rankings report.
///
/// Only the bulk listing can fail the call; enrichment problems leave the
/// affected fields unknown.
pub async fn build_rankings(upstream: &dyn Upstream, opts: &RankingsOptions) -> InkResult<RankingsReport> {
    let endpoints = Endpoints::new(upstream.base_url())?;
    let source = endpoints.protocols();
    let chain = &opts.chain;

    let fetched = upstream.fetch(&source).await.inspect_err(|e| {
        warn!(url = %source, error = %e, "protocol listing unreachable");
    })?;
    if !fetched.ok {
        warn!(url = %source, status = fetched.status, "protocol listing returned non-2xx");
        return Err(InkError::UpstreamStatus { url: source, status: fetched.status });
    }
    let Some(Value::Array(all)) = fetched.json else {
        warn!(url = %source, "protocol listing is not a JSON array");
        return Err(InkError::MalformedPayload {
            url: source,
            message: "expected a JSON array of protocols".into(),
        });
    };

    let mut rows: Vec<ProtocolRow> = all
        .iter()
        .filter(|record| lists_chain(record, chain))
        .filter_map(|record| base_row(record, chain, &opts.guard))
        .collect();
    rank_rows(&mut rows);
    let base_rows = rows.len();
    if let Some(n) = opts.top_n {
        rows.truncate(n);
    }

    info!(
        chain = %chain,
        listed = all.len(),
        base_rows,
        enriching = rows.len(),
        "ranking protocols"
    );

    // Futures are created up front; `buffered` polls at most
    // `enrich_concurrency` of them and yields in input order.
    let tasks: Vec<_> = rows
        .into_iter()
        .map(|row| enrich_row(upstream, &endpoints, opts, row))
        .collect();
    let rows: Vec<ProtocolRow> = stream::iter(tasks)
        .buffered(opts.enrich_concurrency.max(1))
        .collect()
        .await;

    Ok(RankingsReport {
        ok: true,
        chain: chain.name.clone(),
        counts: RankingCounts {
            all_protocols: all.len(),
            base_rows,
            enriched: rows.len(),
        },
        rows,
        source,
        ts: chrono::Utc::now().timestamp_millis(),
    })
}
