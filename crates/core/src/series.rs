//! Time-series extraction and windowed aggregation.
//!
//! Upstream series are chronological (oldest first) and that order is kept
//! everywhere: the "last N" windows below depend on it.

use serde_json::Value;

use inkdash_common::constants::SECONDS_PER_DAY;
use inkdash_common::types::TargetChain;

use crate::json::{num_from_any, pick_chain, to_num};
use crate::pct::percent_change;

/// Value fields tried, in order, on object-shaped series points.
pub const POINT_VALUE_KEYS: &[&str] = &["value", "total", "tvl", "fees", "revenue", "volume", "1"];

/// Value fields on TVL detail points, first non-null wins.
pub const TVL_POINT_KEYS: &[&str] = &["totalLiquidityUSD", "tvl", "totalLiquidity", "value", "usd"];

/// Flatten a series into its numeric values.
///
/// Accepts `[timestamp, value]` pairs (the last element is the value) and
/// objects carrying one of [`POINT_VALUE_KEYS`]. Points that do not coerce
/// to a finite number are dropped; order is preserved.
pub fn extract_series_values(series: &Value) -> Vec<f64> {
    let Some(points) = series.as_array() else {
        return Vec::new();
    };

    points
        .iter()
        .filter_map(|point| match point {
            Value::Array(pair) => pair.last().and_then(to_num),
            Value::Object(obj) => POINT_VALUE_KEYS
                .iter()
                .find_map(|k| obj.get(*k).and_then(to_num)),
            _ => None,
        })
        .collect()
}

pub fn last_value(values: &[f64]) -> Option<f64> {
    values.last().copied()
}

/// Sum of the final `n` values; a shorter series is summed whole.
pub fn sum_last(values: &[f64], n: usize) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let start = values.len().saturating_sub(n);
    Some(values[start..].iter().sum())
}

pub fn sum_all(values: &[f64]) -> Option<f64> {
    sum_last(values, values.len())
}

/// Last-7 vs preceding-7 change of a daily series.
///
/// Assumes one point per day; the cadence is not checked.
pub fn weekly_change_from_daily(values: &[f64]) -> Option<f64> {
    if values.len() < 14 {
        return None;
    }
    let n = values.len();
    let last7: f64 = values[n - 7..].iter().sum();
    let prev7: f64 = values[n - 14..n - 7].iter().sum();
    percent_change(Some(last7), Some(prev7))
}

/// One point of a protocol's chain-scoped TVL history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TvlPoint {
    /// Unix seconds.
    pub date: f64,
    pub value: f64,
}

/// Chain-scoped TVL history from a `/protocol/{slug}` detail payload.
///
/// Reads `chainTvls[<chain>].tvl`; points without a numeric date or value
/// are dropped.
pub fn tvl_series_from_chain(detail: &Value, chain: &TargetChain) -> Vec<TvlPoint> {
    let Some(points) = detail
        .get("chainTvls")
        .and_then(|tvls| pick_chain(tvls, chain))
        .and_then(|entry| entry.get("tvl"))
        .and_then(|tvl| tvl.as_array())
    else {
        return Vec::new();
    };

    points
        .iter()
        .filter_map(|p| {
            let date = p.get("date").and_then(to_num)?;
            let value = num_from_any(p, TVL_POINT_KEYS)?;
            Some(TvlPoint { date, value })
        })
        .collect()
}

/// Value of the most recent point at least `days` before the last point.
///
/// Scans backward so irregular gaps are tolerated. No staleness cutoff is
/// applied: a single ancient point still matches.
pub fn tvl_at_days_ago(series: &[TvlPoint], days: u32) -> Option<f64> {
    let last = series.last()?;
    let target = last.date - f64::from(days) * SECONDS_PER_DAY;
    series
        .iter()
        .rev()
        .find(|p| p.date <= target)
        .map(|p| p.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DAY: f64 = SECONDS_PER_DAY;

    #[test]
    fn test_extract_pairs_drops_malformed_keeps_order() {
        let series = json!([[1, 10], [2, 20], [3, "bad"], [4, 40]]);
        assert_eq!(extract_series_values(&series), vec![10.0, 20.0, 40.0]);
    }

    #[test]
    fn test_extract_object_points() {
        let series = json!([
            {"date": 1, "value": 1},
            {"timestamp": 2, "total": "2"},
            {"date": 3, "fees": 3, "volume": 99},
            {"date": 4, "revenue": null, "volume": 4},
            {"1": 5},
            {"date": 6},
            "junk",
        ]);
        assert_eq!(extract_series_values(&series), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_extract_object_falls_through_unparseable() {
        let series = json!([{"value": "n/a", "total": 8}]);
        assert_eq!(extract_series_values(&series), vec![8.0]);
    }

    #[test]
    fn test_extract_non_array() {
        assert!(extract_series_values(&json!({"a": 1})).is_empty());
        assert!(extract_series_values(&Value::Null).is_empty());
    }

    #[test]
    fn test_last_value() {
        assert_eq!(last_value(&[]), None);
        assert_eq!(last_value(&[1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn test_sum_last_partial_window() {
        assert_eq!(sum_last(&[1.0, 2.0, 3.0], 7), Some(6.0));
        assert_eq!(sum_last(&[1.0, 2.0, 3.0], 2), Some(5.0));
        assert_eq!(sum_last(&[], 7), None);
        assert_eq!(sum_all(&[4.0, 5.0]), Some(9.0));
        assert_eq!(sum_all(&[]), None);
    }

    #[test]
    fn test_weekly_change_needs_14_points() {
        let thirteen = vec![1.0; 13];
        assert_eq!(weekly_change_from_daily(&thirteen), None);
    }

    #[test]
    fn test_weekly_change_exact_14() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let b = [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let values: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
        let expected = percent_change(Some(b.iter().sum()), Some(a.iter().sum()));
        assert_eq!(weekly_change_from_daily(&values), expected);
        assert!((expected.unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_change_uses_final_fortnight() {
        let mut values = vec![1000.0; 5];
        values.extend([1.0; 7]);
        values.extend([2.0; 7]);
        assert_eq!(weekly_change_from_daily(&values), Some(100.0));
    }

    #[test]
    fn test_tvl_series_from_chain() {
        let detail = json!({
            "chainTvls": {
                "ink": {"tvl": [
                    {"date": 100, "totalLiquidityUSD": 5},
                    {"date": "200", "totalLiquidityUSD": "6"},
                    {"date": null, "totalLiquidityUSD": 7},
                    {"date": 300, "usd": 8},
                    {"date": 400}
                ]},
                "Base": {"tvl": [{"date": 1, "totalLiquidityUSD": 1}]}
            }
        });
        let series = tvl_series_from_chain(&detail, &TargetChain::default());
        assert_eq!(
            series,
            vec![
                TvlPoint { date: 100.0, value: 5.0 },
                TvlPoint { date: 200.0, value: 6.0 },
                TvlPoint { date: 300.0, value: 8.0 },
            ]
        );
    }

    #[test]
    fn test_tvl_series_missing_chain() {
        let detail = json!({"chainTvls": {"Base": {"tvl": []}}});
        assert!(tvl_series_from_chain(&detail, &TargetChain::default()).is_empty());
        assert!(tvl_series_from_chain(&json!({}), &TargetChain::default()).is_empty());
    }

    #[test]
    fn test_tvl_at_days_ago_exact_offsets() {
        let series: Vec<TvlPoint> = (0..=30)
            .map(|d| TvlPoint { date: f64::from(d) * DAY, value: f64::from(d) })
            .collect();
        assert_eq!(tvl_at_days_ago(&series, 1), Some(29.0));
        assert_eq!(tvl_at_days_ago(&series, 7), Some(23.0));
        assert_eq!(tvl_at_days_ago(&series, 30), Some(0.0));
        assert_eq!(tvl_at_days_ago(&series, 31), None);
    }

    #[test]
    fn test_tvl_at_days_ago_across_gap() {
        // daily points, then a 10 day reporting gap before the last point
        let series = vec![
            TvlPoint { date: 0.0, value: 1.0 },
            TvlPoint { date: DAY, value: 2.0 },
            TvlPoint { date: 2.0 * DAY, value: 3.0 },
            TvlPoint { date: 12.0 * DAY, value: 4.0 },
        ];
        assert_eq!(tvl_at_days_ago(&series, 1), Some(3.0));
        assert_eq!(tvl_at_days_ago(&series, 7), Some(3.0));
        assert_eq!(tvl_at_days_ago(&series, 11), Some(2.0));
    }

    #[test]
    fn test_tvl_at_days_ago_empty() {
        assert_eq!(tvl_at_days_ago(&[], 1), None);
    }
}
