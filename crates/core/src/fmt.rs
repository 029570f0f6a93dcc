//! Formatting utilities shared by the CLI tables and the table endpoint.
//!
//! Two families: the protocol table (`format_usd_short`, `format_pct_signed`)
//! trims trailing zeros, the key metrics panel (`format_short`,
//! `format_pct_fixed`) always shows two decimals.

use chrono::{DateTime, Utc};

use inkdash_common::constants::PLACEHOLDER;

const SCALES: [(f64, &str); 4] = [(1e12, "t"), (1e9, "b"), (1e6, "m"), (1e3, "k")];

/// Insert `,` every three digits of an unsigned integer string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Round to at most `max_digits` fraction digits, drop trailing zeros,
/// group the integer part. A value that rounds to zero loses its sign.
fn trimmed_decimal(n: f64, max_digits: usize) -> String {
    let rounded = format!("{:.*}", max_digits, n.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let is_zero = int_part.chars().all(|c| c == '0') && frac.is_empty();

    let mut out = String::new();
    if n < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

// ── Protocol table ──

/// `$1.23m`, `-$1.5k`, `$999`. Unknown renders empty.
pub fn format_usd_short(value: Option<f64>) -> String {
    let Some(n) = value else {
        return String::new();
    };
    let sign = if n < 0.0 { "-" } else { "" };
    let abs = n.abs();
    for (scale, suffix) in SCALES {
        if abs >= scale {
            return format!("{sign}${}{suffix}", trimmed_decimal(abs / scale, 2));
        }
    }
    let whole = trimmed_decimal(abs, 0);
    if whole == "0" {
        "$0".into()
    } else {
        format!("{sign}${whole}")
    }
}

/// `+11.11%`, `-5.5%`, `0%`. Unknown renders empty.
pub fn format_pct_signed(value: Option<f64>) -> String {
    match value {
        Some(n) => {
            let sign = if n > 0.0 { "+" } else { "" };
            format!("{sign}{}%", trimmed_decimal(n, 2))
        }
        None => String::new(),
    }
}

// ── Key metrics panel ──

/// Whole dollars with separators.
pub fn format_money(n: f64) -> String {
    format!("${}", trimmed_decimal(n, 0))
}

/// `$1.50m`: two fixed decimals above a thousand, whole dollars below.
pub fn format_short(n: f64) -> String {
    for (scale, suffix) in SCALES {
        if n.abs() >= scale {
            return format!("${:.2}{suffix}", n / scale);
        }
    }
    format_money(n)
}

/// `+0.00%`, `-1.23%`.
pub fn format_pct_fixed(n: f64) -> String {
    let sign = if n >= 0.0 { "+" } else { "" };
    format!("{sign}{n:.2}%")
}

/// Apply a panel formatter, or the placeholder when unknown.
pub fn or_placeholder(value: Option<f64>, f: fn(f64) -> String) -> String {
    value.map(f).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Millisecond timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_timestamp_ms(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }

    #[test]
    fn test_usd_short_millions() {
        assert_eq!(format_usd_short(Some(1_234_567.0)), "$1.23m");
    }

    #[test]
    fn test_usd_short_negative_thousands() {
        assert_eq!(format_usd_short(Some(-1500.0)), "-$1.5k");
    }

    #[test]
    fn test_usd_short_scales() {
        assert_eq!(format_usd_short(Some(12_345_678_901.0)), "$12.35b");
        assert_eq!(format_usd_short(Some(2e12)), "$2t");
        assert_eq!(format_usd_short(Some(1000.0)), "$1k");
        assert_eq!(format_usd_short(Some(1234.0)), "$1.23k");
    }

    #[test]
    fn test_usd_short_small() {
        assert_eq!(format_usd_short(Some(999.0)), "$999");
        assert_eq!(format_usd_short(Some(12.6)), "$13");
        assert_eq!(format_usd_short(Some(0.0)), "$0");
        assert_eq!(format_usd_short(Some(-0.2)), "$0");
    }

    #[test]
    fn test_usd_short_huge_keeps_separators() {
        assert_eq!(format_usd_short(Some(1.5e15)), "$1,500t");
    }

    #[test]
    fn test_usd_short_unknown() {
        assert_eq!(format_usd_short(None), "");
    }

    #[test]
    fn test_pct_signed() {
        assert_eq!(format_pct_signed(Some(11.111)), "+11.11%");
        assert_eq!(format_pct_signed(Some(-5.5)), "-5.5%");
        assert_eq!(format_pct_signed(Some(0.0)), "0%");
        assert_eq!(format_pct_signed(Some(12_345.678)), "+12,345.68%");
        assert_eq!(format_pct_signed(None), "");
    }

    #[test]
    fn test_money() {
        assert_eq!(format_money(1_234_567.8), "$1,234,568");
        assert_eq!(format_money(950.0), "$950");
        assert_eq!(format_money(-1234.0), "$-1,234");
    }

    #[test]
    fn test_short() {
        assert_eq!(format_short(1_500_000.0), "$1.50m");
        assert_eq!(format_short(2_000_000_000.0), "$2.00b");
        assert_eq!(format_short(3e12), "$3.00t");
        assert_eq!(format_short(1000.0), "$1.00k");
        assert_eq!(format_short(950.0), "$950");
    }

    #[test]
    fn test_pct_fixed() {
        assert_eq!(format_pct_fixed(0.0), "+0.00%");
        assert_eq!(format_pct_fixed(4.5678), "+4.57%");
        assert_eq!(format_pct_fixed(-1.234), "-1.23%");
    }

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder(None, format_short), "—");
        assert_eq!(or_placeholder(Some(2.0), format_pct_fixed), "+2.00%");
    }

    #[test]
    fn test_format_timestamp_ms() {
        assert_eq!(format_timestamp_ms(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp_ms(1_700_000_000_000), "2023-11-14 22:13:20 UTC");
    }
}
