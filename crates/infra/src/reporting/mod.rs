//! Periodic export of registry contents
//!
//! [`Reporter`] owns the background loop; [`Report`] is the export step it
//! drives. [`RegistryReporter`] is the export step that walks a
//! [`telemeter_core::MetricsRegistry`] and writes through a
//! [`crate::sender::Sender`].

mod error;
mod registry_reporter;
mod scheduler;

use async_trait::async_trait;
pub use error::{ReportError, ReportResult, ReporterError, ReporterResult};
pub use registry_reporter::RegistryReporter;
pub use scheduler::{Reporter, ReporterStats};

/// One export cycle.
#[async_trait]
pub trait Report: Send + Sync + 'static {
    /// Export everything pending now.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] when some or all of the cycle's points
    /// could not be delivered.
    async fn report_now(&self) -> ReportResult<()>;
}
