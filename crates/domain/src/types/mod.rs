//! Domain types for metric identity and exported distributions

pub mod distribution;
pub mod granularity;
pub mod key;
pub mod tags;

pub use distribution::{Centroid, Distribution};
pub use granularity::Granularity;
pub use key::MetricKey;
pub use tags::{PointTags, TagValue};

use serde::{Deserialize, Serialize};

use crate::impl_enum_conversions;

/// The kinds of metric a registry can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Atomic integer counter
    Counter,
    /// Last-write-wins floating point value
    Gauge,
    /// Windowed distribution
    Histogram,
}

impl_enum_conversions!(MetricKind {
    Counter => "counter",
    Gauge => "gauge",
    Histogram => "histogram",
});
