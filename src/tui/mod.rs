//! Ratatui-based terminal UI.
//!
//! The TUI mirrors the original dashboard: a checkbox list of canonical SKUs
//! on the left, a chart on the right, and a key to flip between the
//! daily-change trend, current-count trend, and candlestick views. Reloading
//! re-runs the whole pipeline and swaps in the new snapshot.

use std::collections::HashSet;
use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{feed_config_from_args, load_aliases, resolve_source, run_feed, RunOutput};
use crate::cli::FeedArgs;
use crate::domain::{FeedConfig, ViewKind};
use crate::error::AppError;
use crate::pipeline::{AliasTable, TrendData};

mod plotters_chart;

use plotters_chart::{Candle, TrendChart};

/// Start the TUI.
pub fn run(args: FeedArgs) -> Result<(), AppError> {
    // Resolve the feed (which may prompt interactively) before switching the
    // terminal into raw mode.
    let source = resolve_source(&args, true)?;
    let config = feed_config_from_args(&args, source);
    let aliases = load_aliases(&config)?;
    let mut app = App::new(config, aliases)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!(
                "Failed to enter alternate screen: {e}"
            )));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: FeedConfig,
    aliases: AliasTable,
    run: RunOutput,
    /// Canonical SKUs in display order, with parallel selection flags.
    skus: Vec<String>,
    selected: Vec<bool>,
    cursor: usize,
    view: ViewKind,
    status: String,
}

impl App {
    fn new(config: FeedConfig, aliases: AliasTable) -> Result<Self, AppError> {
        let run = run_feed(&config, &aliases)?;
        let skus: Vec<String> = run.data.skus().into_iter().map(str::to_string).collect();
        let selected = vec![true; skus.len()];
        let status = format!(
            "Loaded {} rows, {} SKUs, {} dates.",
            run.feed.stats.n_rows,
            skus.len(),
            run.data.dates.len()
        );
        Ok(Self {
            config,
            aliases,
            run,
            skus,
            selected,
            cursor: 0,
            view: ViewKind::Change,
            status,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Down => {
                if self.cursor + 1 < self.skus.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(flag) = self.selected.get_mut(self.cursor) {
                    *flag = !*flag;
                    self.status = format!(
                        "{} {}",
                        self.skus[self.cursor],
                        if *flag { "selected" } else { "deselected" }
                    );
                }
            }
            KeyCode::Char('a') => {
                self.selected.fill(true);
                self.status = "All SKUs selected.".to_string();
            }
            KeyCode::Char('n') => {
                self.selected.fill(false);
                self.status = "Selection cleared.".to_string();
            }
            KeyCode::Char('v') => {
                self.view = self.view.next();
                self.status = format!("view: {}", self.view.display_name());
            }
            KeyCode::Char('r') => {
                self.reload()?;
            }
            _ => {}
        }
        Ok(false)
    }

    /// Re-run the pipeline on the current source and swap in the new snapshot,
    /// preserving selection by SKU name.
    fn reload(&mut self) -> Result<(), AppError> {
        let keep: HashSet<String> = self
            .skus
            .iter()
            .zip(&self.selected)
            .filter(|&(_, &sel)| sel)
            .map(|(sku, _)| sku.clone())
            .collect();

        match run_feed(&self.config, &self.aliases) {
            Ok(run) => {
                self.skus = run.data.skus().into_iter().map(str::to_string).collect();
                self.selected = self.skus.iter().map(|sku| keep.contains(sku)).collect();
                self.cursor = self.cursor.min(self.skus.len().saturating_sub(1));
                self.status = format!(
                    "Reloaded: {} rows, {} dates.",
                    run.feed.stats.n_rows,
                    run.data.dates.len()
                );
                self.run = run;
            }
            Err(err) => {
                // Keep the previous snapshot usable; reloading is best-effort.
                self.status = format!("Reload failed: {err}");
            }
        }
        Ok(())
    }

    fn selected_skus(&self) -> Vec<String> {
        self.skus
            .iter()
            .zip(&self.selected)
            .filter(|&(_, &sel)| sel)
            .map(|(sku, _)| sku.clone())
            .collect()
    }

    /// The SKU shown in candle view: the one under the cursor.
    fn cursor_sku(&self) -> Option<&str> {
        self.skus.get(self.cursor).map(String::as_str)
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let n_selected = self.selected.iter().filter(|&&s| s).count();
        let date_span = match (self.run.data.dates.first(), self.run.data.dates.last()) {
            (Some(first), Some(last)) => format!("{first}..{last}"),
            _ => "-".to_string(),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("skut", Style::default().fg(Color::Cyan)),
                Span::raw(" — SKU membership trends"),
            ]),
            Line::from(Span::styled(
                format!(
                    "feed: {} | rows: {} | dates: {} ({date_span}) | view: {} | selected: {n_selected}/{}",
                    self.run.source.describe(),
                    self.run.feed.stats.n_rows,
                    self.run.data.dates.len(),
                    self.view.display_name(),
                    self.skus.len(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(0)])
            .split(area);

        self.draw_sku_list(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_sku_list(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .skus
            .iter()
            .zip(&self.selected)
            .map(|(sku, &sel)| {
                let mark = if sel { "[x]" } else { "[ ]" };
                ListItem::new(format!("{mark} {sku}"))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("SKUs").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        if !self.skus.is_empty() {
            state.select(Some(self.cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.view {
            ViewKind::Candle => format!(
                "Candles: {}",
                self.cursor_sku().unwrap_or("-")
            ),
            _ => format!("Trend: {}", self.view.display_name()),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.run.data.dates.is_empty() {
            let msg = Paragraph::new("Feed is empty: nothing to chart.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let (lines, candles, x_bounds, y_bounds) = match self.view {
            ViewKind::Candle => {
                let Some(sku) = self.cursor_sku() else {
                    return;
                };
                let (candles, x_bounds, y_bounds) = candle_columns(&self.run.data, sku);
                (Vec::new(), candles, x_bounds, y_bounds)
            }
            view => {
                let (lines, x_bounds, y_bounds) =
                    trend_lines(&self.run.data, &self.selected_skus(), view);
                if lines.is_empty() {
                    let msg = Paragraph::new("No SKUs selected (space toggles, a selects all).")
                        .style(Style::default().fg(Color::Yellow));
                    frame.render_widget(msg, inner);
                    return;
                }
                (lines, Vec::new(), x_bounds, y_bounds)
            }
        };

        let widget = TrendChart {
            lines: &lines,
            candles: &candles,
            dates: &self.run.data.dates,
            x_bounds,
            y_bounds,
            y_label: match self.view {
                ViewKind::Change => "daily change",
                ViewKind::Count => "members",
                ViewKind::Candle => "members",
            },
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ move  space toggle  a all  n none  v view  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build line series (x = date index position) for the selected SKUs.
fn trend_lines(
    data: &TrendData,
    skus: &[String],
    view: ViewKind,
) -> (Vec<(String, Vec<(f64, f64)>)>, [f64; 2], [f64; 2]) {
    let trends = data.trends();
    let n = data.dates.len();

    let mut lines = Vec::new();
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for sku in skus {
        let Some(series) = trends.get(sku) else {
            continue;
        };
        let values = match view {
            ViewKind::Change => &series.daily_change,
            _ => &series.current_count,
        };
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v as f64))
            .collect();
        for &(_, y) in &points {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        lines.push((sku.clone(), points));
    }

    let x_bounds = index_bounds(n, 0.0);
    let y_bounds = padded_bounds(y_min, y_max);
    (lines, x_bounds, y_bounds)
}

/// Build candle columns for one SKU.
fn candle_columns(data: &TrendData, sku: &str) -> (Vec<Candle>, [f64; 2], [f64; 2]) {
    let candles = data.candles();
    let series = candles.get(sku).cloned().unwrap_or_default();

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    let mut out = Vec::with_capacity(series.len());
    for (i, c) in series.iter().enumerate() {
        let prev = c.previous_day_count as f64;
        let curr = c.current_count as f64;
        y_min = y_min.min(prev.min(curr));
        y_max = y_max.max(prev.max(curr));
        out.push((i as f64, prev, curr, c.daily_change >= 0));
    }

    // Half a column of margin so edge candles don't clip.
    let x_bounds = index_bounds(series.len(), 0.5);
    let y_bounds = padded_bounds(y_min, y_max);
    (out, x_bounds, y_bounds)
}

fn index_bounds(n: usize, margin: f64) -> [f64; 2] {
    if n <= 1 {
        return [-0.5 - margin, 0.5 + margin];
    }
    [-margin, (n - 1) as f64 + margin]
}

fn padded_bounds(mut y_min: f64, mut y_max: f64) -> [f64; 2] {
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min - pad, y_max + pad]
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

    fn data() -> pipeline::TrendData {
        let rows = vec![
            row("连续包月", "2024-01-01", 100, 104, 4),
            row("连续包月", "2024-01-02", 104, 101, -3),
            row("抽奖兑换", "2024-01-01", 10, 11, 1),
        ];
        pipeline::run(&rows, &AliasTable::builtin())
    }

    #[test]
    fn trend_lines_cover_selection_with_shared_axis() {
        let data = data();
        let skus = vec!["连续包月".to_string(), "抽奖兑换".to_string()];
        let (lines, x_bounds, y_bounds) = trend_lines(&data, &skus, ViewKind::Count);
        assert_eq!(lines.len(), 2);
        for (_, points) in &lines {
            assert_eq!(points.len(), 2);
        }
        assert_eq!(x_bounds, [0.0, 1.0]);
        // The short SKU's gap day is zero-filled, so the axis reaches 0.
        assert!(y_bounds[0] < 0.0);
        assert!(y_bounds[1] > 104.0);
    }

    #[test]
    fn unknown_selection_is_skipped_not_fatal() {
        let data = data();
        let skus = vec!["不存在".to_string()];
        let (lines, _, y_bounds) = trend_lines(&data, &skus, ViewKind::Change);
        assert!(lines.is_empty());
        // Degenerate bounds fall back to a renderable range.
        assert!(y_bounds[0] < y_bounds[1]);
    }

    #[test]
    fn candle_columns_span_prev_to_curr() {
        let data = data();
        let (candles, x_bounds, y_bounds) = candle_columns(&data, "连续包月");
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0], (0.0, 100.0, 104.0, true));
        assert_eq!(candles[1], (1.0, 104.0, 101.0, false));
        assert_eq!(x_bounds, [-0.5, 1.5]);
        assert!(y_bounds[0] < 100.0 && y_bounds[1] > 104.0);
    }
}
