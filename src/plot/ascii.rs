//! ASCII/Unicode plotting for terminal output.
//!
//! Intentionally "dumb" (fixed-size character grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (golden tests)
//!
//! Trend view: one marker glyph per SKU, segments drawn with `.`.
//! Candle view: one column per date spanning previous -> current count,
//! `#` for up days, `=` for down days.

use crate::domain::{TrendSeries, ViewKind};
use crate::pipeline::TrendData;

/// Marker glyphs assigned to SKUs in selection order.
const MARKERS: [char; 8] = ['o', 'x', '+', '*', '#', '@', '%', '&'];

/// Render trend lines for the selected SKUs.
///
/// `view` picks the measure: `Change` plots daily change, anything else plots
/// current count.
pub fn render_trend_plot(
    data: &TrendData,
    skus: &[String],
    view: ViewKind,
    width: usize,
    height: usize,
) -> String {
    let trends = data.trends();
    let selected: Vec<(&String, &TrendSeries)> = skus
        .iter()
        .filter_map(|sku| trends.get_key_value(sku))
        .collect();

    if data.dates.is_empty() || selected.is_empty() {
        return "No data to plot.\n".to_string();
    }

    let width = width.max(10);
    let height = height.max(5);
    let n = data.dates.len();

    let values = |series: &TrendSeries| -> Vec<i64> {
        match view {
            ViewKind::Change => series.daily_change.clone(),
            _ => series.current_count.clone(),
        }
    };

    let (y_min, y_max) = value_range(selected.iter().flat_map(|(_, s)| values(s)))
        .unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for (series_idx, (_, series)) in selected.iter().enumerate() {
        let marker = MARKERS[series_idx % MARKERS.len()];
        let vals = values(series);

        let mut prev: Option<(usize, usize)> = None;
        for (i, &v) in vals.iter().enumerate() {
            let x = map_x(i, n, width);
            let y = map_y(v as f64, y_min, y_max, height);
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, x, y, '.');
            }
            prev = Some((x, y));
        }
        // Markers overwrite segment glyphs so each SKU stays identifiable.
        for (i, &v) in vals.iter().enumerate() {
            let x = map_x(i, n, width);
            let y = map_y(v as f64, y_min, y_max, height);
            grid[y][x] = marker;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Trend: {} | dates={} ({}..{}) | y=[{y_min:.2}, {y_max:.2}]\n",
        view.display_name(),
        n,
        data.dates[0],
        data.dates[n - 1],
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out.push_str("legend:");
    for (series_idx, (sku, _)) in selected.iter().enumerate() {
        out.push_str(&format!(" {}={}", MARKERS[series_idx % MARKERS.len()], sku));
    }
    out.push('\n');

    out
}

/// Render a candlestick column chart for one SKU.
pub fn render_candle_plot(data: &TrendData, sku: &str, width: usize, height: usize) -> String {
    let candles = data.candles();
    let Some(series) = candles.get(sku) else {
        return format!("No data for SKU '{sku}'.\n");
    };
    if data.dates.is_empty() {
        return "No data to plot.\n".to_string();
    }

    let width = width.max(10);
    let height = height.max(5);
    let n = series.len();

    let (y_min, y_max) = value_range(
        series
            .iter()
            .flat_map(|c| [c.previous_day_count, c.current_count]),
    )
    .unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for (i, candle) in series.iter().enumerate() {
        let x = map_x(i, n, width);
        let y0 = map_y(candle.previous_day_count as f64, y_min, y_max, height);
        let y1 = map_y(candle.current_count as f64, y_min, y_max, height);
        let glyph = if candle.daily_change >= 0 { '#' } else { '=' };
        for y in y0.min(y1)..=y0.max(y1) {
            grid[y][x] = glyph;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Candles: {sku} | dates={} ({}..{}) | count=[{y_min:.2}, {y_max:.2}]\n",
        n,
        data.dates[0],
        data.dates[n - 1],
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out.push_str("up: #  down: =\n");

    out
}

fn value_range(values: impl IntoIterator<Item = i64>) -> Option<(f64, f64)> {
    let mut min = i64::MAX;
    let mut max = i64::MIN;
    let mut seen = false;
    for v in values {
        seen = true;
        min = min.min(v);
        max = max.max(v);
    }
    if !seen || max <= min {
        return None;
    }
    Some((min as f64, max as f64))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(index: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let u = index as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(v: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((v - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // max value -> row 0 (top of the grid)
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish); only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
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
    fn trend_plot_golden_snapshot_small() {
        let rows = vec![
            row("抽奖兑换", "2024-01-01", 5, 5, 0),
            row("抽奖兑换", "2024-01-02", 5, 10, 5),
        ];
        let data = pipeline::run(&rows, &AliasTable::builtin());
        let txt = render_trend_plot(
            &data,
            &["抽奖兑换".to_string()],
            ViewKind::Count,
            10,
            5,
        );
        let expected = concat!(
            "Trend: member count | dates=2 (2024-01-01..2024-01-02) | y=[4.75, 10.25]\n",
            "        .o\n",
            "      ..\n",
            "    ..\n",
            "  ..\n",
            "o.\n",
            "legend: o=抽奖兑换\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn candle_plot_marks_up_and_down_days() {
        let rows = vec![
            row("连续包月", "2024-01-01", 10, 20, 10),
            row("连续包月", "2024-01-02", 20, 12, -8),
        ];
        let data = pipeline::run(&rows, &AliasTable::builtin());
        let txt = render_candle_plot(&data, "连续包月", 10, 6);
        assert!(txt.contains('#'), "up column missing:\n{txt}");
        assert!(txt.contains('='), "down column missing:\n{txt}");
        assert!(txt.starts_with("Candles: 连续包月 | dates=2"));
    }

    #[test]
    fn empty_selection_renders_placeholder() {
        let data = pipeline::run(&[], &AliasTable::builtin());
        assert_eq!(
            render_trend_plot(&data, &[], ViewKind::Change, 40, 10),
            "No data to plot.\n"
        );
        assert_eq!(
            render_candle_plot(&data, "连续包月", 40, 10),
            "No data for SKU '连续包月'.\n"
        );
    }

    #[test]
    fn flat_series_uses_fallback_range() {
        // All values equal: range would be degenerate but must not panic.
        let rows = vec![
            row("花瓣兑换", "2024-01-01", 3, 3, 0),
            row("花瓣兑换", "2024-01-02", 3, 3, 0),
        ];
        let data = pipeline::run(&rows, &AliasTable::builtin());
        let txt = render_trend_plot(&data, &["花瓣兑换".to_string()], ViewKind::Count, 20, 6);
        assert!(txt.contains("legend: o=花瓣兑换"));
    }
}
