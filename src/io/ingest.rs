//! Feed decoding and CSV ingest.
//!
//! Turns a raw byte stream into coerced `SkuRow`s:
//!
//! - **Decode** is fail-closed: if the bytes are neither valid UTF-8 nor valid
//!   GBK (per `--encoding`), no record structure can be recovered and the run
//!   stops with exit code 3.
//! - **Rows** are fail-open: structural CSV errors are collected and skipped,
//!   non-numeric measure fields coerce to 0. The tool is a best-effort
//!   visualization aid, not a data-integrity gate.
//! - **Schema** requires `sku` and `date` columns; the measure columns are
//!   optional per-row.

use std::collections::HashMap;

use csv::StringRecord;
use encoding_rs::GBK;

use crate::domain::{FeedEncoding, SkuRow};
use crate::error::AppError;

/// A row-level problem encountered during ingest (reported, never fatal).
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Summary stats about the rows actually handed to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub n_raw_skus: usize,
    pub n_dates: usize,
    pub date_min: Option<String>,
    pub date_max: Option<String>,
}

/// Ingest output: coerced rows + bookkeeping for the summary report.
#[derive(Debug, Clone)]
pub struct IngestedFeed {
    pub rows: Vec<SkuRow>,
    pub row_errors: Vec<RowError>,
    /// Data rows encountered (used + skipped); blank padding records are not
    /// counted, so `rows_read == rows.len() + row_errors.len()`.
    pub rows_read: usize,
    /// How the bytes were decoded (for the summary, e.g. "gbk (auto)").
    pub encoding_note: String,
    pub stats: DatasetStats,
}

impl IngestedFeed {
    /// Wrap rows that never existed as bytes (the synthetic sample feed).
    pub fn from_rows(rows: Vec<SkuRow>, encoding_note: impl Into<String>) -> Self {
        let stats = compute_stats(&rows);
        let rows_read = rows.len();
        Self {
            rows,
            row_errors: Vec::new(),
            rows_read,
            encoding_note: encoding_note.into(),
            stats,
        }
    }
}

/// Decode feed bytes to text per the requested encoding.
///
/// Returns the decoded text plus a short note describing what was applied.
pub fn decode_feed(bytes: &[u8], encoding: FeedEncoding) -> Result<(String, String), AppError> {
    match encoding {
        FeedEncoding::Utf8 => match std::str::from_utf8(bytes) {
            Ok(text) => Ok((text.to_string(), "utf-8".to_string())),
            Err(e) => Err(AppError::decode(format!("Feed is not valid UTF-8: {e}"))),
        },
        FeedEncoding::Gbk => {
            let (text, _, had_errors) = GBK.decode(bytes);
            if had_errors {
                return Err(AppError::decode("Feed is not valid GBK."));
            }
            Ok((text.into_owned(), "gbk".to_string()))
        }
        FeedEncoding::Auto => {
            if let Ok(text) = std::str::from_utf8(bytes) {
                return Ok((text.to_string(), "utf-8 (auto)".to_string()));
            }
            let (text, _, had_errors) = GBK.decode(bytes);
            if had_errors {
                return Err(AppError::decode(
                    "Feed is neither valid UTF-8 nor valid GBK; cannot recover records.",
                ));
            }
            Ok((text.into_owned(), "gbk (auto)".to_string()))
        }
    }
}

/// Decode and parse a feed byte stream into coerced rows.
pub fn ingest_bytes(bytes: &[u8], encoding: FeedEncoding) -> Result<IngestedFeed, AppError> {
    let (text, encoding_note) = decode_feed(bytes, encoding)?;
    parse_feed(&text, encoding_note)
}

/// Parse decoded feed text. An empty feed is valid and yields empty output.
pub fn parse_feed(text: &str, encoding_note: String) -> Result<IngestedFeed, AppError> {
    if text.trim().is_empty() {
        return Ok(IngestedFeed {
            rows: Vec::new(),
            row_errors: Vec::new(),
            rows_read: 0,
            encoding_note,
            stats: DatasetStats::default(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in ["sku", "date"] {
        if !header_map.contains_key(required) {
            return Err(AppError::input(format!(
                "Missing required column: `{required}`"
            )));
        }
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV lines are 1-based.
        let line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                rows_read += 1;
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        // Fully blank records (trailing newlines, spreadsheet padding) carry
        // no key at all and don't count as data rows; anything else passes
        // through, empty strings included.
        if record.iter().all(str::is_empty) {
            continue;
        }

        rows_read += 1;
        rows.push(parse_row(&record, &header_map));
    }

    let stats = compute_stats(&rows);

    Ok(IngestedFeed {
        rows,
        row_errors,
        rows_read,
        encoding_note,
        stats,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM
    // (e.g. "﻿sku"); without stripping it the schema check reports a
    // missing column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> SkuRow {
    SkuRow {
        sku: get_field(record, header_map, "sku").to_string(),
        date: get_field(record, header_map, "date").to_string(),
        previous_day_count: parse_count(get_field(record, header_map, "previous_day_count")),
        current_count: parse_count(get_field(record, header_map, "current_count")),
        daily_change: parse_count(get_field(record, header_map, "daily_change")),
    }
}

fn get_field<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> &'a str {
    header_map
        .get(name)
        .and_then(|idx| record.get(*idx))
        .unwrap_or("")
}

/// Coerce a count field: missing or non-numeric values contribute 0.
///
/// Fractional values truncate toward zero, matching how the original feed
/// consumer read these columns.
fn parse_count(raw: &str) -> i64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    if let Ok(v) = raw.parse::<i64>() {
        return v;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

fn compute_stats(rows: &[SkuRow]) -> DatasetStats {
    let mut skus = std::collections::BTreeSet::new();
    let mut dates = std::collections::BTreeSet::new();
    for row in rows {
        skus.insert(row.sku.as_str());
        dates.insert(row.date.as_str());
    }
    DatasetStats {
        n_rows: rows.len(),
        n_raw_skus: skus.len(),
        n_dates: dates.len(),
        date_min: dates.iter().next().map(|d| d.to_string()),
        date_max: dates.iter().next_back().map(|d| d.to_string()),
    }
}
