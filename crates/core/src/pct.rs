//! Percentage change with guard rails.

use serde::{Deserialize, Serialize};

use inkdash_common::constants::{DEFAULT_MAX_ABS_PCT, DEFAULT_MIN_BASELINE};

/// `(current - previous) / previous * 100`, or unknown when either side is
/// unknown or non-finite, `previous` is zero, or the result overflows.
pub fn percent_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let (c, p) = (current?, previous?);
    if !c.is_finite() || !p.is_finite() || p == 0.0 {
        return None;
    }
    let pct = (c - p) / p * 100.0;
    pct.is_finite().then_some(pct)
}

/// Thresholds for the guarded percentage.
///
/// Both values are empirical: a protocol listed late on a chain reports a
/// tiny previous TVL, and occasional upstream glitches produce absurd spikes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PctGuard {
    /// Baselines strictly below this yield unknown.
    #[serde(default = "default_min_baseline")]
    pub min_baseline: f64,
    /// Results with a larger magnitude yield unknown.
    #[serde(default = "default_max_abs_pct")]
    pub max_abs_pct: f64,
}

fn default_min_baseline() -> f64 {
    DEFAULT_MIN_BASELINE
}
fn default_max_abs_pct() -> f64 {
    DEFAULT_MAX_ABS_PCT
}

impl Default for PctGuard {
    fn default() -> Self {
        Self {
            min_baseline: DEFAULT_MIN_BASELINE,
            max_abs_pct: DEFAULT_MAX_ABS_PCT,
        }
    }
}

impl PctGuard {
    /// Guarded `percent_change`.
    pub fn apply(&self, current: Option<f64>, previous: Option<f64>) -> Option<f64> {
        let pct = percent_change(current, previous)?;
        if previous? < self.min_baseline || pct.abs() > self.max_abs_pct {
            return None;
        }
        Some(pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_formula() {
        for (c, p) in [(110.0, 100.0), (50.0, 200.0), (-3.0, 7.5), (0.0, -4.0)] {
            let expected = (c - p) / p * 100.0;
            assert_eq!(percent_change(Some(c), Some(p)), Some(expected));
        }
    }

    #[test]
    fn test_percent_change_unknowns() {
        assert_eq!(percent_change(Some(1.0), Some(0.0)), None);
        assert_eq!(percent_change(None, Some(1.0)), None);
        assert_eq!(percent_change(Some(1.0), None), None);
        assert_eq!(percent_change(Some(f64::NAN), Some(1.0)), None);
        assert_eq!(percent_change(Some(1.0), Some(f64::INFINITY)), None);
    }

    #[test]
    fn test_percent_change_overflow_is_unknown() {
        assert_eq!(percent_change(Some(f64::MAX), Some(f64::MIN_POSITIVE)), None);
    }

    #[test]
    fn test_guard_below_floor_always_unknown() {
        let guard = PctGuard::default();
        for current in [0.0, 0.6, 999.0, 1_000_000.0] {
            assert_eq!(guard.apply(Some(current), Some(0.5)), None);
            assert_eq!(guard.apply(Some(current), Some(999.99)), None);
        }
    }

    #[test]
    fn test_guard_floor_is_inclusive() {
        let guard = PctGuard::default();
        let pct = guard.apply(Some(1100.0), Some(1000.0)).unwrap();
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_guard_rejects_outliers() {
        let guard = PctGuard::default();
        // +100100% from a baseline well above the floor
        assert_eq!(guard.apply(Some(1_002_000.0), Some(1000.0)), None);
        // exactly at the bound is kept
        assert_eq!(guard.apply(Some(1_001_000.0), Some(1000.0)), Some(100_000.0));
    }

    #[test]
    fn test_guard_negative_baseline_is_unknown() {
        let guard = PctGuard::default();
        assert_eq!(guard.apply(Some(10.0), Some(-5000.0)), None);
    }

    #[test]
    fn test_guard_custom_thresholds() {
        let guard = PctGuard { min_baseline: 0.0, max_abs_pct: 50.0 };
        assert!(guard.apply(Some(1.2), Some(1.0)).is_some());
        assert_eq!(guard.apply(Some(2.0), Some(1.0)), None);
    }
}
