//! Domain types shared across the pipeline and its consumers.
//!
//! This module defines:
//!
//! - raw feed rows after field coercion (`SkuRow`)
//! - aggregation keys and cells (`AggregateCell`, `DateIndex`)
//! - dense output shapes (`CandleEntry`, `TrendSeries`)
//! - run configuration (`FeedConfig`, `FeedSource`, `FeedEncoding`, `ViewKind`)

pub mod types;

pub use types::*;
