//! The shared aggregation pipeline.
//!
//! Raw rows flow strictly forward:
//!
//! normalize (alias) -> date index -> aggregate -> materialize
//!
//! The whole transformation is a pure function of the parsed rows and the
//! alias table. Every consumer (report, ASCII plot, TUI, exports) goes through
//! this one module; the original system duplicated the normalize/aggregate
//! logic in each chart component and the two copies had started to drift.

use std::collections::BTreeMap;

use crate::domain::{AggregateCell, CandleEntry, DateIndex, SkuRow, TrendSeries};

pub mod aggregate;
pub mod alias;
pub mod date_index;
pub mod series;

pub use aggregate::Aggregate;
pub use alias::AliasTable;

/// The neutral intermediate every view projects from.
///
/// Immutable value snapshot: when a new feed version arrives, consumers run
/// the pipeline again and replace their reference wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendData {
    /// Shared x-axis (sorted, deduplicated feed dates).
    pub dates: DateIndex,
    aggregate: Aggregate,
}

impl TrendData {
    /// Distinct canonical SKUs, in deterministic (sorted) order.
    ///
    /// This is what selection controls (TUI checkbox list) are built from.
    pub fn skus(&self) -> Vec<&str> {
        self.aggregate.keys().map(String::as_str).collect()
    }

    /// Dense candlestick projection (one entry per SKU per index date).
    pub fn candles(&self) -> BTreeMap<String, Vec<CandleEntry>> {
        series::candle_series(&self.aggregate, &self.dates)
    }

    /// Dense trend-line projection (parallel change/count arrays per SKU).
    pub fn trends(&self) -> BTreeMap<String, TrendSeries> {
        series::trend_series(&self.aggregate, &self.dates)
    }

    /// Summed cell for one `(canonical SKU, date)` key, if any rows hit it.
    pub fn cell(&self, sku: &str, date: &str) -> Option<AggregateCell> {
        self.aggregate.get(sku)?.get(date).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregate.is_empty()
    }
}

/// Run the full pipeline over a parsed feed.
pub fn run(rows: &[SkuRow], aliases: &AliasTable) -> TrendData {
    let dates = date_index::build_date_index(rows);
    let aggregate = aggregate::aggregate(rows, aliases);
    TrendData { dates, aggregate }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sku: &str, date: &str, prev: i64, curr: i64, change: i64) -> SkuRow {
        SkuRow {
            sku: sku.to_string(),
            date: date.to_string(),
            previous_day_count: prev,
            current_count: curr,
            daily_change: change,
        }
    }

    #[test]
    fn rerunning_the_pipeline_is_idempotent() {
        let rows = vec![
            row("一年会员", "2024-01-02", 3, 4, 1),
            row("连续包年首年", "2024-01-01", 7, 7, 0),
            row("1年会员", "2024-01-02", 1, 1, 0),
        ];
        let aliases = AliasTable::builtin();
        let first = run(&rows, &aliases);
        let second = run(&rows, &aliases);
        assert_eq!(first, second);
        assert_eq!(first.candles(), second.candles());
        assert_eq!(first.trends(), second.trends());
    }

    #[test]
    fn empty_feed_produces_empty_everything() {
        let data = run(&[], &AliasTable::builtin());
        assert!(data.dates.is_empty());
        assert!(data.is_empty());
        assert!(data.skus().is_empty());
        assert!(data.candles().is_empty());
        assert!(data.trends().is_empty());
    }

    #[test]
    fn sku_keys_are_canonical_and_sorted() {
        let rows = vec![
            row("连续包年首年", "2024-01-01", 1, 1, 0),
            row("一年会员", "2024-01-01", 1, 1, 0),
            row("连续包年", "2024-01-01", 1, 1, 0),
        ];
        let data = run(&rows, &AliasTable::builtin());
        assert_eq!(data.skus(), vec!["1年会员", "连续包年"]);
    }
}
