//! Command-line parsing for the SKU trend tool.
//!
//! Argument parsing and command dispatch stay separate from the pipeline code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{FeedEncoding, ViewKind};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "skut", version, about = "SKU membership trend charts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the feed summary and per-SKU overview table.
    Show(FeedArgs),
    /// Render ASCII charts in the terminal.
    Plot(PlotArgs),
    /// Export dense per-SKU series to CSV and/or JSON.
    Export(ExportArgs),
    /// Launch the interactive TUI.
    ///
    /// Uses the same aggregation pipeline as the other subcommands, with a
    /// checkbox SKU list and Plotters-rendered charts.
    Tui(FeedArgs),
}

/// Feed source and pipeline options shared by every subcommand.
#[derive(Debug, Parser, Clone)]
pub struct FeedArgs {
    /// Path to the feed CSV.
    #[arg(short = 'f', long)]
    pub feed: Option<PathBuf>,

    /// Fetch the feed from a URL (defaults to $SKU_FEED_URL when set).
    #[arg(long)]
    pub url: Option<String>,

    /// Use the built-in synthetic demo feed (no I/O).
    #[arg(long)]
    pub sample: bool,

    /// Days of history generated for the demo feed.
    #[arg(long, default_value_t = 30)]
    pub sample_days: usize,

    /// Seed for the demo feed generator.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Feed byte encoding.
    #[arg(long, value_enum, default_value_t = FeedEncoding::Auto)]
    pub encoding: FeedEncoding,

    /// Custom alias table (JSON: {"version": N, "aliases": {raw: canonical}}).
    #[arg(long)]
    pub aliases: Option<PathBuf>,
}

/// Options for terminal plots.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Chart view.
    #[arg(long, value_enum, default_value_t = ViewKind::Change)]
    pub view: ViewKind,

    /// SKUs to plot (canonical labels; repeatable). Default: all SKUs for
    /// trend views, the largest SKU for the candle view.
    #[arg(long = "sku")]
    pub skus: Vec<String>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for series exports.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Write dense per-(SKU, date) rows to this CSV file.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write the full series bundle (both shapes) to this JSON file.
    #[arg(long)]
    pub json: Option<PathBuf>,
}
