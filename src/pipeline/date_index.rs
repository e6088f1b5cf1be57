//! Shared x-axis construction.

use std::collections::BTreeSet;

use crate::domain::{DateIndex, SkuRow};

/// Collect the distinct `date` labels of a feed, sorted ascending.
///
/// The index is built once per feed and shared by all downstream aggregation;
/// every dense series must have exactly this length so chart axes line up
/// across SKUs. Feed dates are fixed-width ISO labels, so the lexicographic
/// sort is also chronological.
pub fn build_date_index(rows: &[SkuRow]) -> DateIndex {
    let dates: BTreeSet<&str> = rows.iter().map(|row| row.date.as_str()).collect();
    dates.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sku: &str, date: &str) -> SkuRow {
        SkuRow {
            sku: sku.to_string(),
            date: date.to_string(),
            previous_day_count: 0,
            current_count: 0,
            daily_change: 0,
        }
    }

    #[test]
    fn dedupes_and_sorts_ascending() {
        let rows = vec![
            row("a", "2024-01-03"),
            row("b", "2024-01-01"),
            row("a", "2024-01-01"),
            row("c", "2024-01-02"),
            row("c", "2024-01-03"),
        ];
        let index = build_date_index(&rows);
        assert_eq!(index, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
    }

    #[test]
    fn length_equals_distinct_date_count() {
        let rows = vec![
            row("a", "2024-02-10"),
            row("b", "2024-02-10"),
            row("c", "2024-02-11"),
        ];
        assert_eq!(build_date_index(&rows).len(), 2);
    }

    #[test]
    fn empty_feed_yields_empty_index() {
        assert!(build_date_index(&[]).is_empty());
    }
}
