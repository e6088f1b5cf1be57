//! Feed sources.
//!
//! - remote CSV fetch over HTTP(S) (`remote`)
//! - deterministic synthetic demo feed (`sample`)

pub mod remote;
pub mod sample;

pub use remote::*;
pub use sample::*;
