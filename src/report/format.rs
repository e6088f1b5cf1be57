//! Terminal formatting for summaries and tables.

use crate::domain::FeedSource;
use crate::io::ingest::IngestedFeed;
use crate::pipeline::TrendData;
use crate::report::SkuOverview;

/// Format the feed summary (origin + decode note + row stats + date span).
pub fn format_feed_summary(feed: &IngestedFeed, data: &TrendData, source: &FeedSource) -> String {
    let mut out = String::new();

    out.push_str("=== skut - SKU membership trends ===\n");
    out.push_str(&format!("Feed: {}\n", source.describe()));
    out.push_str(&format!("Encoding: {}\n", feed.encoding_note));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        feed.rows_read,
        feed.stats.n_rows,
        feed.row_errors.len(),
    ));
    out.push_str(&format!(
        "SKUs: {} raw -> {} canonical\n",
        feed.stats.n_raw_skus,
        data.skus().len(),
    ));

    match (&feed.stats.date_min, &feed.stats.date_max) {
        (Some(min), Some(max)) => {
            out.push_str(&format!(
                "Dates: {} ({min} .. {max})\n",
                data.dates.len()
            ));
        }
        _ => out.push_str("Dates: 0 (empty feed)\n"),
    }

    if !feed.row_errors.is_empty() {
        out.push_str("\nRow problems (skipped):\n");
        for err in &feed.row_errors {
            out.push_str(&format!("- line {}: {}\n", err.line, err.message));
        }
    }

    out
}

/// Format the per-SKU overview table.
pub fn format_sku_table(overview: &[SkuOverview]) -> String {
    let mut out = String::new();

    if overview.is_empty() {
        out.push_str("No SKUs in feed.\n");
        return out;
    }

    out.push_str(
        format!(
            "{:<16} {:>10} {:>10} {:>10} {:>10}\n",
            "sku", "latest", "net", "best day", "worst day"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<16} {:-<10} {:-<10} {:-<10} {:-<10}\n", "", "", "", "", "").trim_end(),
    );
    out.push('\n');

    for o in overview {
        out.push_str(
            format!(
                "{:<16} {:>10} {:>+10} {:>+10} {:>+10}\n",
                truncate(&o.sku, 16),
                o.latest_count,
                o.net_change,
                o.peak_gain,
                o.peak_loss,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
