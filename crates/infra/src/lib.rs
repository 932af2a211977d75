//! # Telemeter Infrastructure
//!
//! Everything in Telemeter that touches the outside world.
//!
//! This crate contains:
//! - The periodic [`reporting::Reporter`] and its registry export step
//! - The [`sender::Sender`] port and the Wavefront [`sender::ProxySender`]
//! - Configuration loading from environment variables and files
//! - `tracing` subscriber initialisation
//!
//! ## Architecture
//! - Builds on the instruments in `telemeter-core`
//! - Contains all I/O (TCP, files, environment, stdout)

pub mod config;
pub mod observability;
pub mod reporting;
pub mod sender;

pub use reporting::{
    RegistryReporter, Report, ReportError, ReportResult, Reporter, ReporterError, ReporterResult,
    ReporterStats,
};
pub use sender::{ProxySender, Sender, SenderError, SenderResult};
