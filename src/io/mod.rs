//! Input/output helpers.
//!
//! - feed decode + CSV ingest (`ingest`)
//! - dense series exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
