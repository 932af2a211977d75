//! # Telemeter Core
//!
//! In-process metric instruments and the registry that owns them.
//!
//! - [`Counter`] and [`Gauge`]: lock-free scalars
//! - [`Histogram`]: time-windowed, thread-sharded distributions built on
//!   mergeable [`sketch::Sketch`]es
//! - [`MetricsRegistry`]: concurrent get-or-create store keyed by
//!   [`telemeter_domain::MetricKey`]
//!
//! Nothing here performs I/O; exporting lives in `telemeter-infra`.

pub mod clock;
pub mod meters;
pub mod registry;
pub mod sketch;

pub use clock::{Clock, MockClock, SystemClock};
pub use meters::{Counter, Gauge, Histogram, Metric, Percentiles, ShardHandle, Snapshot};
pub use registry::MetricsRegistry;
