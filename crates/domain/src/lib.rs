//! # Telemeter Domain
//!
//! Pure types shared by the Telemeter crates.
//!
//! This crate contains:
//! - Metric identity (`MetricKey`, `PointTags`) and `MetricKind`
//! - Histogram window sizes and exported `Distribution`s
//! - Configuration structures with defaults and validation
//! - The `TelemeterError` type and `TelemeterResult` alias
//!
//! ## Architecture
//! - No dependencies on other Telemeter crates
//! - No network or file I/O, no threads, no clocks (the default point
//!   source is the only OS lookup)

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
