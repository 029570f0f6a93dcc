//! Column registry for the protocol table.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use inkdash_common::types::ProtocolRow;

use crate::fmt::{format_pct_signed, format_usd_short};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    Name,
    Category,
    Tvl,
    #[serde(rename = "tvl_1d_pct")]
    Tvl1dPct,
    #[serde(rename = "tvl_7d_pct")]
    Tvl7dPct,
    #[serde(rename = "tvl_1m_pct")]
    Tvl1mPct,
    #[serde(rename = "fees_24h")]
    Fees24h,
    #[serde(rename = "fees_7d")]
    Fees7d,
    #[serde(rename = "fees_30d")]
    Fees30d,
    #[serde(rename = "fees_1y")]
    Fees1y,
    #[serde(rename = "spot_volume_24h")]
    SpotVolume24h,
    #[serde(rename = "spot_volume_7d")]
    SpotVolume7d,
    #[serde(rename = "spot_change_7d")]
    SpotChange7d,
    SpotCumulativeVolume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
}

pub const DEFAULT_COLUMNS: &[ColumnKey] = &[
    ColumnKey::Name,
    ColumnKey::Category,
    ColumnKey::Tvl,
    ColumnKey::Tvl1dPct,
    ColumnKey::Tvl7dPct,
    ColumnKey::Tvl1mPct,
    ColumnKey::Fees24h,
    ColumnKey::SpotVolume24h,
];

/// Shown after the default columns in the advanced view.
pub const ADVANCED_EXTRA_COLUMNS: &[ColumnKey] = &[
    ColumnKey::Fees7d,
    ColumnKey::Fees30d,
    ColumnKey::Fees1y,
    ColumnKey::SpotVolume7d,
    ColumnKey::SpotChange7d,
    ColumnKey::SpotCumulativeVolume,
];

pub fn columns_for(advanced: bool) -> Vec<ColumnKey> {
    let mut cols = DEFAULT_COLUMNS.to_vec();
    if advanced {
        cols.extend_from_slice(ADVANCED_EXTRA_COLUMNS);
    }
    cols
}

/// What a column holds and how it renders.
enum Cell {
    Text(fn(&ProtocolRow) -> &str),
    Usd(fn(&ProtocolRow) -> Option<f64>),
    Pct(fn(&ProtocolRow) -> Option<f64>),
}

impl ColumnKey {
    pub const ALL: [ColumnKey; 14] = [
        ColumnKey::Name,
        ColumnKey::Category,
        ColumnKey::Tvl,
        ColumnKey::Tvl1dPct,
        ColumnKey::Tvl7dPct,
        ColumnKey::Tvl1mPct,
        ColumnKey::Fees24h,
        ColumnKey::Fees7d,
        ColumnKey::Fees30d,
        ColumnKey::Fees1y,
        ColumnKey::SpotVolume24h,
        ColumnKey::SpotVolume7d,
        ColumnKey::SpotChange7d,
        ColumnKey::SpotCumulativeVolume,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Tvl => "tvl",
            Self::Tvl1dPct => "tvl_1d_pct",
            Self::Tvl7dPct => "tvl_7d_pct",
            Self::Tvl1mPct => "tvl_1m_pct",
            Self::Fees24h => "fees_24h",
            Self::Fees7d => "fees_7d",
            Self::Fees30d => "fees_30d",
            Self::Fees1y => "fees_1y",
            Self::SpotVolume24h => "spot_volume_24h",
            Self::SpotVolume7d => "spot_volume_7d",
            Self::SpotChange7d => "spot_change_7d",
            Self::SpotCumulativeVolume => "spot_cumulative_volume",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Category => "Category",
            Self::Tvl => "TVL",
            Self::Tvl1dPct => "TVL 1d %",
            Self::Tvl7dPct => "TVL 7d %",
            Self::Tvl1mPct => "TVL 1m %",
            Self::Fees24h => "Fees 24h",
            Self::Fees7d => "Fees 7d",
            Self::Fees30d => "Fees 30d",
            Self::Fees1y => "Fees 1y",
            Self::SpotVolume24h => "Spot Volume 24h",
            Self::SpotVolume7d => "Spot Volume 7d",
            Self::SpotChange7d => "Spot Change 7d",
            Self::SpotCumulativeVolume => "Spot Cumulative Volume",
        }
    }

    pub fn align(self) -> Align {
        match self {
            Self::Name | Self::Category => Align::Left,
            _ => Align::Right,
        }
    }

    fn cell(self) -> Cell {
        match self {
            Self::Name => Cell::Text(|r| r.name.as_str()),
            Self::Category => Cell::Text(|r| r.category.as_str()),
            Self::Tvl => Cell::Usd(|r| r.tvl),
            Self::Tvl1dPct => Cell::Pct(|r| r.change_1d_pct),
            Self::Tvl7dPct => Cell::Pct(|r| r.change_7d_pct),
            Self::Tvl1mPct => Cell::Pct(|r| r.change_1m_pct),
            Self::Fees24h => Cell::Usd(|r| r.fees_24h),
            Self::Fees7d => Cell::Usd(|r| r.fees_7d),
            Self::Fees30d => Cell::Usd(|r| r.fees_30d),
            Self::Fees1y => Cell::Usd(|r| r.fees_1y),
            Self::SpotVolume24h => Cell::Usd(|r| r.spot_volume_24h),
            Self::SpotVolume7d => Cell::Usd(|r| r.spot_volume_7d),
            Self::SpotChange7d => Cell::Pct(|r| r.spot_change_7d),
            Self::SpotCumulativeVolume => Cell::Usd(|r| r.spot_cumulative_volume),
        }
    }

    pub fn render(self, row: &ProtocolRow) -> String {
        match self.cell() {
            Cell::Text(get) => get(row).to_string(),
            Cell::Usd(get) => format_usd_short(get(row)),
            Cell::Pct(get) => format_pct_signed(get(row)),
        }
    }

    /// Unknown numbers order after known ones whatever the direction.
    fn compare(self, a: &ProtocolRow, b: &ProtocolRow, descending: bool) -> Ordering {
        let dir = |o: Ordering| if descending { o.reverse() } else { o };
        match self.cell() {
            Cell::Text(get) => dir(get(a).to_lowercase().cmp(&get(b).to_lowercase())),
            Cell::Usd(get) | Cell::Pct(get) => match (get(a), get(b)) {
                (Some(x), Some(y)) => dir(x.total_cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl FromStr for ColumnKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ColumnKey::ALL
            .into_iter()
            .find(|c| c.key() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = ColumnKey::ALL.iter().map(|c| c.key()).collect();
                format!("unknown column '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Stable sort on one column. Unknown numeric values go last in either
/// direction; ties keep the incoming (rank) order.
pub fn sort_rows(rows: &mut [ProtocolRow], key: ColumnKey, descending: bool) {
    rows.sort_by(|a, b| key.compare(a, b, descending));
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub key: ColumnKey,
    pub label: &'static str,
    pub align: Align,
}

/// Rows rendered to display strings for a chosen view.
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolTable {
    pub ok: bool,
    pub chain: String,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Vec<String>>,
}

/// View options shared by `inkdash rankings` and the table endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TableView {
    #[serde(default)]
    pub advanced: bool,
    #[serde(default)]
    pub sort: Option<ColumnKey>,
    #[serde(default)]
    pub desc: bool,
}

impl ProtocolTable {
    /// Sort (when asked) and render ranked rows for a view.
    pub fn for_view(chain: &str, mut rows: Vec<ProtocolRow>, view: TableView) -> Self {
        if let Some(key) = view.sort {
            sort_rows(&mut rows, key, view.desc);
        }
        Self::build(chain, &rows, &columns_for(view.advanced))
    }

    pub fn build(chain: &str, rows: &[ProtocolRow], columns: &[ColumnKey]) -> Self {
        Self {
            ok: true,
            chain: chain.to_string(),
            columns: columns
                .iter()
                .map(|&key| ColumnSpec { key, label: key.label(), align: key.align() })
                .collect(),
            rows: rows
                .iter()
                .map(|row| columns.iter().map(|c| c.render(row)).collect())
                .collect(),
        }
    }
}
