//! Shared domain types.
//!
//! These types are intentionally lightweight and (where exported) serializable
//! so they can be:
//!
//! - used in-memory by the aggregation pipeline
//! - exported to CSV/JSON
//! - consumed by the terminal/TUI presentation layers

use std::path::PathBuf;

use clap::ValueEnum;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

/// A single raw feed row after field coercion.
///
/// Numeric fields are already coerced at ingest time: missing or non-numeric
/// source values become 0 (the feed is best-effort visualization data, not a
/// ledger). `sku` and `date` are kept verbatim; any string is a valid key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuRow {
    pub sku: String,
    pub date: String,
    pub previous_day_count: i64,
    pub current_count: i64,
    pub daily_change: i64,
}

/// Summed measures for one `(canonical SKU, date)` key.
///
/// Duplicate rows for the same key always accumulate into the existing cell.
/// Replacing the cell instead would silently drop contributions from feeds
/// where several source systems report partial counts for the same day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCell {
    pub previous_day_count: i64,
    pub current_count: i64,
    pub daily_change: i64,
}

impl AggregateCell {
    /// Accumulate one row's measures into this cell (add, never replace).
    pub fn absorb(&mut self, row: &SkuRow) {
        self.previous_day_count += row.previous_day_count;
        self.current_count += row.current_count;
        self.daily_change += row.daily_change;
    }
}

/// Sorted, deduplicated date labels; the shared x-axis for every series.
///
/// Feed dates are fixed-width ISO labels, so lexicographic order is
/// chronological order.
pub type DateIndex = Vec<String>;

/// One dense candlestick entry.
///
/// Serializes as the 4-tuple `[date, previous_day_count, current_count,
/// daily_change]`, the shape chart consumers index positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleEntry {
    pub date: String,
    pub previous_day_count: i64,
    pub current_count: i64,
    pub daily_change: i64,
}

impl CandleEntry {
    /// Zero-filled placeholder for an index date with no feed rows.
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            previous_day_count: 0,
            current_count: 0,
            daily_change: 0,
        }
    }
}

impl Serialize for CandleEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(4)?;
        tup.serialize_element(&self.date)?;
        tup.serialize_element(&self.previous_day_count)?;
        tup.serialize_element(&self.current_count)?;
        tup.serialize_element(&self.daily_change)?;
        tup.end()
    }
}

/// Two parallel dense series aligned to the date index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrendSeries {
    pub daily_change: Vec<i64>,
    pub current_count: Vec<i64>,
}

/// Text encoding of the raw feed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedEncoding {
    /// Accept valid UTF-8, otherwise fall back to GBK.
    Auto,
    /// Strict UTF-8.
    Utf8,
    /// GBK (common for spreadsheet exports of the original feed).
    Gbk,
}

/// Which chart view to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Daily-change trend lines.
    Change,
    /// Current-count trend lines.
    Count,
    /// Day-over-day candlesticks (previous count -> current count).
    Candle,
}

impl ViewKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ViewKind::Change => "daily change",
            ViewKind::Count => "member count",
            ViewKind::Candle => "candlestick",
        }
    }

    /// Cycle order used by the TUI `v` key.
    pub fn next(self) -> Self {
        match self {
            ViewKind::Change => ViewKind::Count,
            ViewKind::Count => ViewKind::Candle,
            ViewKind::Candle => ViewKind::Change,
        }
    }
}

/// Where the raw feed bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Local CSV file.
    File(PathBuf),
    /// Remote CSV fetched over HTTP(S).
    Url(String),
    /// Deterministic synthetic demo feed (no I/O).
    Sample,
}

impl FeedSource {
    /// Short origin label for summaries and the TUI header.
    pub fn describe(&self) -> String {
        match self {
            FeedSource::File(path) => path.display().to_string(),
            FeedSource::Url(url) => url.clone(),
            FeedSource::Sample => "synthetic sample".to_string(),
        }
    }
}

/// A full run's configuration as understood by the app layer.
///
/// Derived from CLI flags plus defaults; the pure pipeline itself only sees
/// parsed rows and the alias table.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub source: FeedSource,
    pub encoding: FeedEncoding,
    /// Optional JSON alias table overriding the built-in one.
    pub alias_path: Option<PathBuf>,
    /// Days of history generated by the sample feed.
    pub sample_days: usize,
    /// Seed for the sample feed generator.
    pub sample_seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_entry_serializes_as_4_tuple() {
        let entry = CandleEntry {
            date: "2024-01-01".to_string(),
            previous_day_count: 15,
            current_count: 17,
            daily_change: 2,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"["2024-01-01",15,17,2]"#);
    }

    #[test]
    fn absorb_accumulates_all_measures() {
        let mut cell = AggregateCell::default();
        let row = SkuRow {
            sku: "1年会员".to_string(),
            date: "2024-01-01".to_string(),
            previous_day_count: 10,
            current_count: 12,
            daily_change: 2,
        };
        cell.absorb(&row);
        cell.absorb(&row);
        assert_eq!(
            cell,
            AggregateCell {
                previous_day_count: 20,
                current_count: 24,
                daily_change: 4,
            }
        );
    }

    #[test]
    fn view_kind_cycles_through_all_views() {
        let start = ViewKind::Change;
        assert_eq!(start.next(), ViewKind::Count);
        assert_eq!(start.next().next(), ViewKind::Candle);
        assert_eq!(start.next().next().next(), start);
    }
}
