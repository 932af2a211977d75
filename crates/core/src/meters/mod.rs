//! Metric instruments held by the registry

mod counter;
mod gauge;
mod histogram;
mod shard;
mod snapshot;

use std::sync::Arc;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::Histogram;
pub use shard::ShardHandle;
pub use snapshot::{Percentiles, Snapshot};
use telemeter_domain::{MetricKey, MetricKind};

/// A registered metric. Cloning shares the underlying instrument.
#[derive(Debug, Clone)]
pub enum Metric {
    /// Atomic integer counter
    Counter(Arc<Counter>),
    /// Last-write-wins gauge
    Gauge(Arc<Gauge>),
    /// Windowed distribution
    Histogram(Arc<Histogram>),
}

impl Metric {
    /// Registry key of the underlying instrument.
    #[must_use]
    pub fn key(&self) -> &MetricKey {
        match self {
            Self::Counter(counter) => counter.key(),
            Self::Gauge(gauge) => gauge.key(),
            Self::Histogram(histogram) => histogram.key(),
        }
    }

    /// Kind of the wrapped meter.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        match self {
            Self::Counter(_) => MetricKind::Counter,
            Self::Gauge(_) => MetricKind::Gauge,
            Self::Histogram(_) => MetricKind::Histogram,
        }
    }

    /// The counter, if this is one.
    #[must_use]
    pub fn as_counter(&self) -> Option<&Arc<Counter>> {
        match self {
            Self::Counter(counter) => Some(counter),
            _ => None,
        }
    }

    /// The gauge, if this is one.
    #[must_use]
    pub fn as_gauge(&self) -> Option<&Arc<Gauge>> {
        match self {
            Self::Gauge(gauge) => Some(gauge),
            _ => None,
        }
    }

    /// The histogram, if this is one.
    #[must_use]
    pub fn as_histogram(&self) -> Option<&Arc<Histogram>> {
        match self {
            Self::Histogram(histogram) => Some(histogram),
            _ => None,
        }
    }

    /// True when both values share the same instrument.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Counter(a), Self::Counter(b)) => Arc::ptr_eq(a, b),
            (Self::Gauge(a), Self::Gauge(b)) => Arc::ptr_eq(a, b),
            (Self::Histogram(a), Self::Histogram(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! impl_metric_from {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Metric {
                fn from(metric: $variant) -> Self {
                    Self::$variant(Arc::new(metric))
                }
            }

            impl From<Arc<$variant>> for Metric {
                fn from(metric: Arc<$variant>) -> Self {
                    Self::$variant(metric)
                }
            }
        )+
    };
}

impl_metric_from!(Counter, Gauge, Histogram);
