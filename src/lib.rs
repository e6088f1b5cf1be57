//! `sku-trends` library crate.
//!
//! The binary (`skut`) is a thin wrapper around this library so that:
//!
//! - the aggregation pipeline is testable without spawning processes
//! - modules are reusable (e.g., future GUI/daemon, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod tui;
