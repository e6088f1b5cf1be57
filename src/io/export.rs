//! Export dense series to CSV and JSON.
//!
//! Exports are meant for spreadsheets and downstream scripts, so they carry
//! the fully materialized (gap-free) series rather than the raw feed rows.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{CandleEntry, DateIndex, TrendSeries};
use crate::error::AppError;
use crate::pipeline::TrendData;

/// Write one dense `(sku, date)` row per index position to a CSV file.
pub fn write_series_csv(path: &Path, data: &TrendData) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::runtime(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "sku,date,previous_day_count,current_count,daily_change")
        .map_err(|e| AppError::runtime(format!("Failed to write export CSV header: {e}")))?;

    for (sku, series) in data.candles() {
        for entry in series {
            writeln!(
                file,
                "{},{},{},{},{}",
                sku, entry.date, entry.previous_day_count, entry.current_count, entry.daily_change
            )
            .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
        }
    }

    Ok(())
}

/// The JSON export schema: shared date axis plus both shapes per SKU.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesBundle {
    pub tool: String,
    pub dates: DateIndex,
    pub skus: BTreeMap<String, SkuBundle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkuBundle {
    /// `[date, previous_day_count, current_count, daily_change]` tuples.
    pub candles: Vec<CandleEntry>,
    pub trend: TrendSeries,
}

impl SeriesBundle {
    pub fn from_data(data: &TrendData) -> Self {
        let mut candles = data.candles();
        let mut trends = data.trends();
        let skus = data
            .skus()
            .into_iter()
            .map(|sku| {
                let bundle = SkuBundle {
                    candles: candles.remove(sku).unwrap_or_default(),
                    trend: trends.remove(sku).unwrap_or_default(),
                };
                (sku.to_string(), bundle)
            })
            .collect();
        Self {
            tool: "skut".to_string(),
            dates: data.dates.clone(),
            skus,
        }
    }
}

/// Write both series shapes for every SKU to a JSON file.
pub fn write_series_json(path: &Path, data: &TrendData) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::runtime(format!("Failed to create export JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, &SeriesBundle::from_data(data))
        .map_err(|e| AppError::runtime(format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SkuRow;
    use crate::pipeline::{self, AliasTable};

    fn sample_data() -> TrendData {
        let rows = vec![
            SkuRow {
                sku: "一年会员".to_string(),
                date: "2024-01-01".to_string(),
                previous_day_count: 10,
                current_count: 12,
                daily_change: 2,
            },
            SkuRow {
                sku: "抽奖兑换".to_string(),
                date: "2024-01-02".to_string(),
                previous_day_count: 3,
                current_count: 3,
                daily_change: 0,
            },
        ];
        pipeline::run(&rows, &AliasTable::builtin())
    }

    #[test]
    fn bundle_carries_dense_series_for_every_sku() {
        let bundle = SeriesBundle::from_data(&sample_data());
        assert_eq!(bundle.dates.len(), 2);
        assert_eq!(bundle.skus.len(), 2);
        for sku in bundle.skus.values() {
            assert_eq!(sku.candles.len(), 2);
            assert_eq!(sku.trend.current_count.len(), 2);
        }
    }

    #[test]
    fn bundle_json_uses_tuple_candles() {
        let bundle = SeriesBundle::from_data(&sample_data());
        let json = serde_json::to_value(&bundle).unwrap();
        let candles = &json["skus"]["1年会员"]["candles"];
        assert_eq!(candles[0][0], "2024-01-01");
        assert_eq!(candles[0][1], 10);
        assert_eq!(candles[0][2], 12);
        assert_eq!(candles[0][3], 2);
        // Gap day materializes as a zero tuple, not an omission.
        assert_eq!(candles[1][2], 0);
    }
}
