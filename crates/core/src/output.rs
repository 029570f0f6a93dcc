//! Unified output rendering: JSON or human-readable table.
//!
//! ```ignore
//! use inkdash_core::output::{render, OutputFormat};
//!
//! let panel = key_metrics(&snapshot);
//! render(format, &panel)?;
//! ```

use serde::Serialize;

use inkdash_common::types::ChainTvlSnapshot;

use crate::columns::{Align, ProtocolTable};
use crate::config::AppConfig;
use crate::fmt::{format_pct_fixed, format_short, format_timestamp_ms, or_placeholder};
use crate::metrics::KeyMetrics;
use crate::probe::{ProbeReport, ProbeResult};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table (default).
    #[default]
    Table,
    /// Compact JSON (for piping to jq, scripts).
    Json,
    /// Pretty-printed JSON (for reading).
    JsonPretty,
}

/// Types that can render as a human-readable table.
pub trait TableDisplay {
    /// The table, one terminal line per element.
    fn table_lines(&self) -> Vec<String>;

    fn print_table(&self) {
        for line in self.table_lines() {
            println!("{line}");
        }
    }
}

/// Render structured output, JSON or table depending on format.
pub fn render<T: Serialize + TableDisplay>(format: OutputFormat, data: &T) -> anyhow::Result<()> {
    if !render_json_or(format, data)? {
        data.print_table();
    }
    Ok(())
}

/// Render just the JSON formats (for callers that table-render a
/// different value than they serialize). Returns false in table mode.
pub fn render_json_or<T: Serialize>(format: OutputFormat, data: &T) -> anyhow::Result<bool> {
    match format {
        OutputFormat::Table => Ok(false),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(data)?);
            Ok(true)
        }
        OutputFormat::JsonPretty => {
            println!("{}", serde_json::to_string_pretty(data)?);
            Ok(true)
        }
    }
}

// ─── Table helpers ──────────────────────────────────────────────────

fn width(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &str, w: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{s:<w$}"),
        Align::Right => format!("{s:>w$}"),
    }
}

fn rule(widths: &[usize], left: char, mid: char, right: char) -> String {
    let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", inner.join(&mid.to_string()))
}

/// Fixed-width box with a title and `label : value` lines.
fn boxed(title: &str, rows: &[(String, String)]) -> Vec<String> {
    let label_w = rows.iter().map(|(l, _)| width(l)).max().unwrap_or(0);
    let body: Vec<String> = rows
        .iter()
        .map(|(l, v)| format!("{l:<label_w$} : {v}"))
        .collect();
    let inner = body
        .iter()
        .map(|b| width(b))
        .chain([width(title)])
        .max()
        .unwrap_or(0)
        + 4;

    let mut out = Vec::with_capacity(body.len() + 4);
    out.push(format!("╔{}╗", "═".repeat(inner)));
    out.push(format!("║  {title:<w$}║", w = inner - 2));
    out.push(format!("╠{}╣", "═".repeat(inner)));
    for line in body {
        out.push(format!("║  {line:<w$}║", w = inner - 2));
    }
    out.push(format!("╚{}╝", "═".repeat(inner)));
    out
}

// ─── TableDisplay implementations ───────────────────────────────────

impl TableDisplay for ProtocolTable {
    fn table_lines(&self) -> Vec<String> {
        if self.rows.is_empty() {
            return vec![format!("No protocols found on {}.", self.chain)];
        }

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| width(c))
                    .chain([width(col.label)])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: Vec<String>| format!("│ {} │", cells.join(" │ "));

        let mut out = Vec::with_capacity(self.rows.len() + 4);
        out.push(rule(&widths, '┌', '┬', '┐'));
        out.push(line(
            self.columns
                .iter()
                .zip(&widths)
                .map(|(col, &w)| pad(col.label, w, col.align))
                .collect(),
        ));
        out.push(rule(&widths, '├', '┼', '┤'));
        for row in &self.rows {
            out.push(line(
                self.columns
                    .iter()
                    .zip(&widths)
                    .zip(row)
                    .map(|((col, &w), cell)| pad(cell, w, col.align))
                    .collect(),
            ));
        }
        out.push(rule(&widths, '└', '┴', '┘'));
        out
    }
}

impl TableDisplay for KeyMetrics {
    fn table_lines(&self) -> Vec<String> {
        let mut rows = Vec::new();
        for metric in &self.metrics {
            rows.push((metric.label.clone(), metric.value_text.clone()));
            for detail in &metric.details {
                rows.push((format!("  {}", detail.label), detail.value_text.clone()));
            }
        }
        boxed(&format!("{} KEY METRICS", self.chain.to_uppercase()), &rows)
    }
}

impl TableDisplay for ChainTvlSnapshot {
    fn table_lines(&self) -> Vec<String> {
        boxed(
            &format!("{} TVL", self.chain.to_uppercase()),
            &[
                ("TVL".into(), or_placeholder(self.tvl, format_short)),
                ("Change 24h".into(), or_placeholder(self.tvl_change_24h_pct, format_pct_fixed)),
                ("As of".into(), format_timestamp_ms(self.ts)),
            ],
        )
    }
}

fn probe_line(p: &ProbeResult) -> String {
    let mark = if p.ok { "✓" } else { "✗" };
    match &p.error {
        Some(e) => format!("{mark} {} (error: {e})", p.url),
        None => format!("{mark} {} [{}]", p.url, p.status),
    }
}

impl TableDisplay for ProbeReport {
    fn table_lines(&self) -> Vec<String> {
        let mut out = vec![format!("Probe: {}", self.debug), String::new(), "Fees:".into()];
        out.push(format!("  {}", probe_line(&self.fees)));
        out.push("Revenue:".into());
        out.extend(self.revenue.iter().map(|p| format!("  {}", probe_line(p))));
        out
    }
}

impl TableDisplay for AppConfig {
    fn table_lines(&self) -> Vec<String> {
        let top_n = self
            .rankings
            .top_n
            .map_or_else(|| "all".to_string(), |n| n.to_string());
        boxed(
            "INKDASH CONFIGURATION",
            &[
                ("Chain".into(), format!("{} ({})", self.chain.name, self.chain.slug)),
                ("Upstream".into(), self.upstream.base_url.clone()),
                ("Timeout".into(), format!("{}s", self.upstream.timeout_secs)),
                ("In flight".into(), self.upstream.max_in_flight.to_string()),
                ("Concurrency".into(), self.rankings.enrich_concurrency.to_string()),
                ("Top N".into(), top_n),
                ("Min baseline".into(), self.thresholds.min_baseline.to_string()),
                ("Max |pct|".into(), self.thresholds.max_abs_pct.to_string()),
                ("Bind".into(), self.server.bind.clone()),
                ("Verbose".into(), self.system.verbose.to_string()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::DEFAULT_COLUMNS;
    use crate::metrics::key_metrics;
    use inkdash_common::types::{ProtocolRow, SnapshotSource};

    #[test]
    fn test_protocol_table_lines_align() {
        let rows = vec![
            ProtocolRow { name: "Foo".into(), category: "Dexs".into(), tvl: Some(1_234_567.0), ..Default::default() },
            ProtocolRow { name: "LongerName".into(), tvl: Some(5.0), ..Default::default() },
        ];
        let table = ProtocolTable::build("Ink", &rows, DEFAULT_COLUMNS);
        let lines = table.table_lines();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with('┌'));
        assert!(lines[1].contains("Name      "));
        assert!(lines[3].contains("│ Foo        │"));
        assert!(lines[3].contains("$1.23m"));
        // right aligned under a wider header
        assert!(lines[4].contains("│     $5 │"));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_empty_table() {
        let table = ProtocolTable::build("Ink", &[], DEFAULT_COLUMNS);
        assert_eq!(table.table_lines(), vec!["No protocols found on Ink.".to_string()]);
    }

    #[test]
    fn test_metrics_box() {
        let snapshot = ChainTvlSnapshot {
            ok: true,
            chain: "Ink".into(),
            tvl: Some(2_500_000.0),
            tvl_change_24h_pct: None,
            source: SnapshotSource { chains_url: String::new(), hist_url: String::new() },
            ts: 0,
        };
        let lines = key_metrics(&snapshot).table_lines();
        assert!(lines[1].contains("INK KEY METRICS"));
        assert!(lines.iter().any(|l| l.contains("Total Value Locked in DeFi : $2.50m")));
        assert!(lines.iter().any(|l| l.contains("Change (24h)") && l.contains('—')));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_render_json_or_table_mode() {
        assert!(!render_json_or(OutputFormat::Table, &serde_json::json!({})).unwrap());
        assert!(render_json_or(OutputFormat::Json, &serde_json::json!({})).unwrap());
    }
}
