//! Plotters-powered trend/candle chart widget for Ratatui.
//!
//! Plotters output is rendered into the Ratatui buffer via
//! `plotters-ratatui-backend`, which gives nicer axes and mesh handling than
//! the built-in `Chart` widget.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Palette assigned to trend lines in selection order.
const LINE_COLORS: [RGBColor; 8] = [
    RGBColor(0, 255, 255),
    RGBColor(255, 255, 0),
    RGBColor(0, 255, 0),
    RGBColor(255, 0, 255),
    RGBColor(255, 165, 0),
    RGBColor(100, 149, 237),
    RGBColor(255, 105, 180),
    RGBColor(160, 255, 160),
];

/// One candle column: x position, previous count, current count, up day.
pub type Candle = (f64, f64, f64, bool);

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call so `render()`
/// stays focused on drawing and the data prep is testable on its own.
pub struct TrendChart<'a> {
    /// Line series, one per selected SKU (x = date index position).
    pub lines: &'a [(String, Vec<(f64, f64)>)],
    /// Candle columns (empty unless the candle view is active).
    pub candles: &'a [Candle],
    /// Shared date axis labels (indexed by rounded x value).
    pub dates: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
}

impl<'a> Widget for TrendChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint
        // instead of panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res; keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| date_label(self.dates, *v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for (idx, (_, points)) in self.lines.iter().enumerate() {
                let color = LINE_COLORS[idx % LINE_COLORS.len()];
                chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
            }

            // Candle columns: filled body between previous and current count,
            // warm color for up days, cool for down days (the original chart's
            // red-up/green-down convention).
            let up_color = RGBColor(239, 83, 80);
            let down_color = RGBColor(38, 166, 154);
            chart.draw_series(self.candles.iter().map(|&(x, prev, curr, up)| {
                let color = if up { up_color } else { down_color };
                let (lo, hi) = if prev <= curr { (prev, curr) } else { (curr, prev) };
                Rectangle::new([(x - 0.3, lo), (x + 0.3, hi)], color.filled())
            }))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Short `MM-DD` label for an x tick, clamped to the date axis.
fn date_label(dates: &[String], v: f64) -> String {
    if dates.is_empty() {
        return String::new();
    }
    let idx = (v.round().max(0.0) as usize).min(dates.len() - 1);
    short_date(&dates[idx])
}

/// Shorten an ISO date label to `MM-DD`; non-ISO labels pass through.
pub fn short_date(date: &str) -> String {
    match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%m-%d").to_string(),
        Err(_) => date.to_string(),
    }
}
