//! Reporting: per-SKU overviews and formatted terminal output.
//!
//! Formatting stays in `format` so the pipeline code never builds strings and
//! output changes stay localized.

use crate::pipeline::TrendData;

pub mod format;

pub use format::*;

/// One summary line per canonical SKU, derived from the dense trend series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuOverview {
    pub sku: String,
    /// Current count on the last index date.
    pub latest_count: i64,
    /// Sum of daily changes over the whole window.
    pub net_change: i64,
    /// Largest single-day gain in the window.
    pub peak_gain: i64,
    /// Largest single-day loss in the window (<= 0).
    pub peak_loss: i64,
}

/// Compute per-SKU overviews, sorted by latest count descending
/// (ties broken by SKU label so output stays deterministic).
pub fn compute_overview(data: &TrendData) -> Vec<SkuOverview> {
    let mut out: Vec<SkuOverview> = data
        .trends()
        .into_iter()
        .map(|(sku, series)| SkuOverview {
            sku,
            latest_count: series.current_count.last().copied().unwrap_or(0),
            net_change: series.daily_change.iter().sum(),
            peak_gain: series.daily_change.iter().copied().max().unwrap_or(0).max(0),
            peak_loss: series.daily_change.iter().copied().min().unwrap_or(0).min(0),
        })
        .collect();
    out.sort_by(|a, b| {
        b.latest_count
            .cmp(&a.latest_count)
            .then_with(|| a.sku.cmp(&b.sku))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SkuRow;
    use crate::pipeline::{self, AliasTable};

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
    fn overview_summarizes_the_window() {
        let rows = vec![
            row("连续包月", "2024-01-01", 100, 104, 4),
            row("连续包月", "2024-01-02", 104, 101, -3),
            row("连续包月", "2024-01-03", 101, 106, 5),
        ];
        let data = pipeline::run(&rows, &AliasTable::builtin());
        let overview = compute_overview(&data);
        assert_eq!(overview.len(), 1);
        let o = &overview[0];
        assert_eq!(o.latest_count, 106);
        assert_eq!(o.net_change, 6);
        assert_eq!(o.peak_gain, 5);
        assert_eq!(o.peak_loss, -3);
    }

    #[test]
    fn overview_sorts_by_latest_count_descending() {
        let rows = vec![
            row("抽奖兑换", "2024-01-01", 1, 2, 1),
            row("连续包月", "2024-01-01", 90, 95, 5),
        ];
        let data = pipeline::run(&rows, &AliasTable::builtin());
        let overview = compute_overview(&data);
        assert_eq!(overview[0].sku, "连续包月");
        assert_eq!(overview[1].sku, "抽奖兑换");
    }

    #[test]
    fn empty_data_yields_empty_overview() {
        let data = pipeline::run(&[], &AliasTable::builtin());
        assert!(compute_overview(&data).is_empty());
    }
}
