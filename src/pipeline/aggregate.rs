//! Grouping and accumulation.

use std::collections::BTreeMap;

use crate::domain::{AggregateCell, SkuRow};
use crate::pipeline::alias::AliasTable;

/// Sparse aggregation result: canonical SKU -> date -> summed cell.
///
/// Ordered maps keep iteration (and therefore every derived series, report,
/// and export) deterministic for a given feed.
pub type Aggregate = BTreeMap<String, BTreeMap<String, AggregateCell>>;

/// Group rows by `(canonical SKU, date)`, summing the three measures.
///
/// Duplicate keys accumulate into the existing cell; a cell is zero-initialized
/// on first encounter. Rows degraded to zero at ingest (non-numeric fields)
/// simply contribute zero here, so the aggregator never rejects a row.
pub fn aggregate(rows: &[SkuRow], aliases: &AliasTable) -> Aggregate {
    let mut out = Aggregate::new();
    for row in rows {
        let sku = aliases.canonical(&row.sku);
        out.entry(sku.to_string())
            .or_default()
            .entry(row.date.clone())
            .or_default()
            .absorb(row);
    }
    out
}
