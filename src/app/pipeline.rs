//! Shared "load + aggregate" logic used by every front-end.
//!
//! One place for the workflow:
//! resolve source -> load bytes -> decode -> parse -> aggregate
//!
//! The CLI subcommands and the TUI then focus on presentation. Re-running this
//! on a fresh feed version yields a new immutable snapshot; consumers replace
//! their reference wholesale.

use std::fs;

use crate::cli::{picker, FeedArgs};
use crate::data;
use crate::domain::{FeedConfig, FeedSource};
use crate::error::AppError;
use crate::io::ingest::{self, IngestedFeed};
use crate::pipeline::{self, AliasTable, TrendData};

/// All computed outputs of one feed load.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub feed: IngestedFeed,
    pub data: TrendData,
    pub source: FeedSource,
}

/// Resolve the feed source from CLI flags.
///
/// Priority: `--sample` > `-f` > `--url` > `$SKU_FEED_URL` > interactive
/// picker (when allowed).
pub fn resolve_source(args: &FeedArgs, interactive: bool) -> Result<FeedSource, AppError> {
    if args.sample {
        return Ok(FeedSource::Sample);
    }
    if let Some(path) = &args.feed {
        return Ok(FeedSource::File(picker::validate_feed_path(path)?));
    }
    if let Some(url) = &args.url {
        return Ok(FeedSource::Url(url.clone()));
    }
    if let Some(url) = data::remote::feed_url_from_env() {
        return Ok(FeedSource::Url(url));
    }
    if interactive {
        return Ok(FeedSource::File(picker::prompt_for_feed_path()?));
    }
    Err(AppError::input(
        "No feed source. Pass `-f <file.csv>`, `--url <URL>`, set SKU_FEED_URL, or use --sample.",
    ))
}

/// Build the run configuration from CLI flags.
pub fn feed_config_from_args(args: &FeedArgs, source: FeedSource) -> FeedConfig {
    FeedConfig {
        source,
        encoding: args.encoding,
        alias_path: args.aliases.clone(),
        sample_days: args.sample_days,
        sample_seed: args.seed,
    }
}

/// Load the alias table (custom JSON when given, built-in otherwise).
pub fn load_aliases(config: &FeedConfig) -> Result<AliasTable, AppError> {
    match &config.alias_path {
        Some(path) => AliasTable::from_json_file(path),
        None => Ok(AliasTable::builtin()),
    }
}

/// Execute the full load + aggregation and return the snapshot.
pub fn run_feed(config: &FeedConfig, aliases: &AliasTable) -> Result<RunOutput, AppError> {
    let feed = match &config.source {
        FeedSource::Sample => {
            let rows = data::sample::generate_sample(config.sample_days, config.sample_seed)?;
            IngestedFeed::from_rows(rows, "n/a (generated)")
        }
        FeedSource::File(path) => {
            let bytes = fs::read(path).map_err(|e| {
                AppError::input(format!("Failed to read feed '{}': {e}", path.display()))
            })?;
            ingest::ingest_bytes(&bytes, config.encoding)?
        }
        FeedSource::Url(url) => {
            let bytes = data::remote::fetch_feed_bytes(url)?;
            ingest::ingest_bytes(&bytes, config.encoding)?
        }
    };

    let data = pipeline::run(&feed.rows, aliases);

    Ok(RunOutput {
        feed,
        data,
        source: config.source.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeedEncoding;

    fn sample_config() -> FeedConfig {
        FeedConfig {
            source: FeedSource::Sample,
            encoding: FeedEncoding::Auto,
            alias_path: None,
            sample_days: 10,
            sample_seed: 1,
        }
    }

    #[test]
    fn sample_run_produces_aligned_snapshot() {
        let config = sample_config();
        let aliases = load_aliases(&config).unwrap();
        let run = run_feed(&config, &aliases).unwrap();
        assert_eq!(run.data.dates.len(), 10);
        for series in run.data.candles().values() {
            assert_eq!(series.len(), 10);
        }
    }

    #[test]
    fn reloading_the_same_feed_gives_the_same_snapshot() {
        let config = sample_config();
        let aliases = load_aliases(&config).unwrap();
        let a = run_feed(&config, &aliases).unwrap();
        let b = run_feed(&config, &aliases).unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn source_resolution_requires_some_source() {
        let args = FeedArgs {
            feed: None,
            url: None,
            sample: false,
            sample_days: 30,
            seed: 42,
            encoding: FeedEncoding::Auto,
            aliases: None,
        };
        // Non-interactive resolution must fail cleanly when the environment
        // has no feed URL either.
        if data::remote::feed_url_from_env().is_none() {
            let err = resolve_source(&args, false).unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }
    }
}
