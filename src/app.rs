//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads and aggregates the feed
//! - prints summaries/plots
//! - writes optional exports
//! - launches the TUI

use clap::Parser;

use crate::cli::{Command, ExportArgs, FeedArgs, PlotArgs};
use crate::domain::ViewKind;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `skut` binary.
pub fn run() -> Result<(), AppError> {
    // Bare `skut` (or `skut --sample`) should behave like `skut tui ...`.
    //
    // Clap requires a subcommand name, so we rewrite the argv list explicitly
    // before parsing; this keeps the clap structure clean while giving the
    // dashboard-like default UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Plot(args) => handle_plot(args),
        Command::Export(args) => handle_export(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_show(args: FeedArgs) -> Result<(), AppError> {
    let source = pipeline::resolve_source(&args, true)?;
    let config = pipeline::feed_config_from_args(&args, source);
    let aliases = pipeline::load_aliases(&config)?;
    let run = pipeline::run_feed(&config, &aliases)?;

    print!(
        "{}",
        crate::report::format_feed_summary(&run.feed, &run.data, &run.source)
    );
    println!();
    print!(
        "{}",
        crate::report::format_sku_table(&crate::report::compute_overview(&run.data))
    );

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let source = pipeline::resolve_source(&args.feed, true)?;
    let config = pipeline::feed_config_from_args(&args.feed, source);
    let aliases = pipeline::load_aliases(&config)?;
    let run = pipeline::run_feed(&config, &aliases)?;

    let skus = select_skus(&run, &args.skus, args.view)?;

    match args.view {
        ViewKind::Candle => {
            for sku in &skus {
                print!(
                    "{}",
                    crate::plot::render_candle_plot(&run.data, sku, args.width, args.height)
                );
                println!();
            }
        }
        _ => {
            print!(
                "{}",
                crate::plot::render_trend_plot(&run.data, &skus, args.view, args.width, args.height)
            );
        }
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.csv.is_none() && args.json.is_none() {
        return Err(AppError::input(
            "Nothing to export. Pass `--csv <path>` and/or `--json <path>`.",
        ));
    }

    let source = pipeline::resolve_source(&args.feed, true)?;
    let config = pipeline::feed_config_from_args(&args.feed, source);
    let aliases = pipeline::load_aliases(&config)?;
    let run = pipeline::run_feed(&config, &aliases)?;

    if let Some(path) = &args.csv {
        crate::io::export::write_series_csv(path, &run.data)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.json {
        crate::io::export::write_series_json(path, &run.data)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Resolve which SKUs to plot.
///
/// Explicit `--sku` labels are validated against the canonical set. With no
/// explicit selection, trend views plot everything and the candle view plots
/// the largest SKU (one candle chart per SKU gets noisy fast).
fn select_skus(
    run: &pipeline::RunOutput,
    requested: &[String],
    view: ViewKind,
) -> Result<Vec<String>, AppError> {
    let available = run.data.skus();

    if !requested.is_empty() {
        for sku in requested {
            if !available.contains(&sku.as_str()) {
                return Err(AppError::input(format!(
                    "Unknown SKU '{sku}'. Known: {}",
                    available.join(", ")
                )));
            }
        }
        return Ok(requested.to_vec());
    }

    match view {
        ViewKind::Candle => Ok(crate::report::compute_overview(&run.data)
            .into_iter()
            .take(1)
            .map(|o| o.sku)
            .collect()),
        _ => Ok(available.into_iter().map(str::to_string).collect()),
    }
}

/// Rewrite argv so `skut` defaults to `skut tui`.
///
/// Rules:
/// - `skut`                      -> `skut tui`
/// - `skut --sample ...`         -> `skut tui --sample ...`
/// - `skut --help/--version/-h`  -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "plot" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // A leading flag means "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["skut"])), argv(&["skut", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["skut", "--sample"])),
            argv(&["skut", "tui", "--sample"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["skut", "show", "-f", "x.csv"])),
            argv(&["skut", "show", "-f", "x.csv"])
        );
        assert_eq!(rewrite_args(argv(&["skut", "--help"])), argv(&["skut", "--help"]));
    }
}
