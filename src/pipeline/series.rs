//! Dense series materialization.
//!
//! Expands the sparse aggregate into per-SKU arrays aligned to the date
//! index. Missing `(SKU, date)` cells become zero-valued entries, never gaps:
//! chart axes rely on every series having one value per index position.

use std::collections::BTreeMap;

use crate::domain::{CandleEntry, DateIndex, TrendSeries};
use crate::pipeline::aggregate::Aggregate;

/// Project the aggregate into candlestick shape: per SKU, one
/// `[date, prev, curr, change]` entry per index date.
pub fn candle_series(aggregate: &Aggregate, dates: &DateIndex) -> BTreeMap<String, Vec<CandleEntry>> {
    aggregate
        .iter()
        .map(|(sku, cells)| {
            let series = dates
                .iter()
                .map(|date| match cells.get(date) {
                    Some(cell) => CandleEntry {
                        date: date.clone(),
                        previous_day_count: cell.previous_day_count,
                        current_count: cell.current_count,
                        daily_change: cell.daily_change,
                    },
                    None => CandleEntry::empty(date),
                })
                .collect();
            (sku.clone(), series)
        })
        .collect()
}

/// Project the aggregate into trend shape: per SKU, two parallel arrays of
/// daily change and current count, aligned to the index.
pub fn trend_series(aggregate: &Aggregate, dates: &DateIndex) -> BTreeMap<String, TrendSeries> {
    aggregate
        .iter()
        .map(|(sku, cells)| {
            let mut series = TrendSeries {
                daily_change: Vec::with_capacity(dates.len()),
                current_count: Vec::with_capacity(dates.len()),
            };
            for date in dates {
                let cell = cells.get(date).copied().unwrap_or_default();
                series.daily_change.push(cell.daily_change);
                series.current_count.push(cell.current_count);
            }
            (sku.clone(), series)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SkuRow;
    use crate::pipeline::aggregate::aggregate;
    use crate::pipeline::alias::AliasTable;
    use crate::pipeline::date_index::build_date_index;

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
    fn every_series_spans_the_full_date_index() {
        // "连续包季" only appears on day 1; "抽奖兑换" only on days 2 and 3.
        let rows = vec![
            row("连续包季", "2024-03-01", 5, 6, 1),
            row("抽奖兑换", "2024-03-02", 2, 2, 0),
            row("抽奖兑换", "2024-03-03", 2, 4, 2),
        ];
        let dates = build_date_index(&rows);
        let agg = aggregate(&rows, &AliasTable::builtin());

        for series in candle_series(&agg, &dates).values() {
            assert_eq!(series.len(), dates.len());
        }
        for series in trend_series(&agg, &dates).values() {
            assert_eq!(series.daily_change.len(), dates.len());
            assert_eq!(series.current_count.len(), dates.len());
        }
    }

    #[test]
    fn missing_dates_fill_with_zero_entries_not_gaps() {
        let rows = vec![
            row("连续包季", "2024-03-01", 5, 6, 1),
            row("抽奖兑换", "2024-03-02", 2, 2, 0),
        ];
        let dates = build_date_index(&rows);
        let agg = aggregate(&rows, &AliasTable::builtin());

        let candles = candle_series(&agg, &dates);
        assert_eq!(candles["连续包季"][1], CandleEntry::empty("2024-03-02"));

        let trends = trend_series(&agg, &dates);
        assert_eq!(trends["连续包季"].daily_change, vec![1, 0]);
        assert_eq!(trends["连续包季"].current_count, vec![6, 0]);
    }

    #[test]
    fn alias_merge_scenario_produces_spec_series() {
        let rows = vec![
            row("一年会员", "2024-01-01", 10, 12, 2),
            row("1年会员", "2024-01-01", 5, 5, 0),
        ];
        let dates = build_date_index(&rows);
        assert_eq!(dates, vec!["2024-01-01"]);

        let agg = aggregate(&rows, &AliasTable::builtin());
        let candles = candle_series(&agg, &dates);
        assert_eq!(
            candles["1年会员"],
            vec![CandleEntry {
                date: "2024-01-01".to_string(),
                previous_day_count: 15,
                current_count: 17,
                daily_change: 2,
            }]
        );
    }

    #[test]
    fn empty_aggregate_materializes_to_empty_maps() {
        let dates: DateIndex = Vec::new();
        let agg = Aggregate::new();
        assert!(candle_series(&agg, &dates).is_empty());
        assert!(trend_series(&agg, &dates).is_empty());
    }
}
