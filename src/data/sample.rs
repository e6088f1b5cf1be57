//! Synthetic demo feed.
//!
//! Generates a seeded random-walk membership history so the tool can be tried
//! without a real export. The generator deliberately produces the same
//! irregularities the real feed has: alias spellings of SKU labels and
//! occasional split rows (two partial counts for one SKU+day).

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::SkuRow;
use crate::error::AppError;

/// Canonical SKUs with a plausible baseline membership level.
const SAMPLE_SKUS: &[(&str, i64)] = &[
    ("1个月会员", 1200),
    ("1年会员", 5200),
    ("2年会员", 800),
    ("其他活动兑换", 150),
    ("抽奖兑换", 300),
    ("花瓣兑换", 650),
    ("连续包季", 2100),
    ("连续包年", 4300),
    ("连续包月", 9500),
];

/// Daily change scale relative to the baseline level.
const DAILY_VOL: f64 = 0.012;

/// Fraction of rows emitted under an alias spelling (when one exists).
const ALIAS_PROB: f64 = 0.25;

/// Fraction of SKU-days split into two partial rows.
const SPLIT_PROB: f64 = 0.15;

/// First date of the generated history.
const START_DATE: (i32, u32, u32) = (2024, 1, 1);

fn alias_spelling(canonical: &str) -> Option<&'static str> {
    match canonical {
        "1个月会员" => Some("一个月会员"),
        "1年会员" => Some("一年会员"),
        "2年会员" => Some("两年会员"),
        "连续包年" => Some("连续包年首年"),
        "连续包月" => Some("连续包月首月"),
        _ => None,
    }
}

/// Generate `days` of history for every sample SKU. Deterministic per seed.
pub fn generate_sample(days: usize, seed: u64) -> Result<Vec<SkuRow>, AppError> {
    let (y, m, d) = START_DATE;
    let start = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| AppError::runtime("Invalid sample start date."))?;
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::runtime(format!("Noise distribution error: {e}")))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(days * SAMPLE_SKUS.len());

    for &(sku, baseline) in SAMPLE_SKUS {
        let mut level = baseline;
        for day in 0..days {
            let date = (start + Duration::days(day as i64))
                .format("%Y-%m-%d")
                .to_string();

            let z: f64 = normal.sample(&mut rng);
            let mut change = (z * baseline as f64 * DAILY_VOL).round() as i64;
            // Membership counts stay non-negative.
            change = change.max(-level);

            let prev = level;
            level += change;

            let label = match alias_spelling(sku) {
                Some(alias) if rng.gen_bool(ALIAS_PROB) => alias,
                _ => sku,
            };

            if rng.gen_bool(SPLIT_PROB) {
                // Two partial rows whose measures sum to the full day.
                let frac = rng.gen_range(0.3..0.7);
                let prev_a = (prev as f64 * frac).round() as i64;
                let change_a = (change as f64 * frac).round() as i64;
                rows.push(make_row(label, &date, prev_a, change_a));
                rows.push(make_row(label, &date, prev - prev_a, change - change_a));
            } else {
                rows.push(make_row(label, &date, prev, change));
            }
        }
    }

    Ok(rows)
}

fn make_row(sku: &str, date: &str, prev: i64, change: i64) -> SkuRow {
    SkuRow {
        sku: sku.to_string(),
        date: date.to_string(),
        previous_day_count: prev,
        current_count: prev + change,
        daily_change: change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{self, AliasTable};

    #[test]
    fn same_seed_yields_identical_feed() {
        let a = generate_sample(30, 42).unwrap();
        let b = generate_sample(30, 42).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn rows_are_internally_consistent() {
        for row in generate_sample(20, 7).unwrap() {
            assert_eq!(row.current_count, row.previous_day_count + row.daily_change);
            assert!(row.current_count >= 0, "negative count for {}", row.sku);
        }
    }

    #[test]
    fn pipeline_over_sample_covers_every_day() {
        let rows = generate_sample(14, 3).unwrap();
        let data = pipeline::run(&rows, &AliasTable::builtin());
        assert_eq!(data.dates.len(), 14);
        // Alias spellings collapse, so only canonical labels remain.
        for sku in data.skus() {
            assert!(SAMPLE_SKUS.iter().any(|&(name, _)| name == sku), "{sku}");
        }
        for series in data.candles().values() {
            assert_eq!(series.len(), 14);
        }
    }

    #[test]
    fn zero_days_is_an_empty_feed() {
        assert!(generate_sample(0, 1).unwrap().is_empty());
    }
}
