//! Concurrent metric registry
//!
//! Metrics are keyed by [`MetricKey`] in a sharded `DashMap`. Registration
//! is get-or-create: the existence check and insert happen inside one map
//! entry operation, so concurrent registrations of the same key agree on a
//! single winner.

use std::sync::{Arc, OnceLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use telemeter_domain::{
    HistogramConfig, MetricKey, MetricKind, PointTags, TelemeterError, TelemeterResult,
};
use tracing::debug;

use crate::clock::Clock;
use crate::meters::{Counter, Gauge, Histogram, Metric};

static GLOBAL_REGISTRY: OnceLock<Arc<MetricsRegistry>> = OnceLock::new();

/// Concurrent store of every metric instance, keyed by name and tags.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    metrics: DashMap<MetricKey, Metric>,
}

impl MetricsRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first call.
    ///
    /// Nothing registers here implicitly; callers opt in and tear down with
    /// [`MetricsRegistry::clear`].
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(Self::new())))
    }

    /// Register `metric` under its own key.
    ///
    /// If the key is already taken the existing metric is returned and
    /// `metric` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::InvalidIdentity`] if the metric name is blank.
    pub fn add(&self, metric: impl Into<Metric>) -> TelemeterResult<Metric> {
        let metric = metric.into();
        let key = metric.key().clone();
        self.get_or_insert_with(key, |_| Ok(metric))
    }

    /// Metric registered under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &MetricKey) -> Option<Metric> {
        self.metrics.get(key).map(|entry| entry.value().clone())
    }

    /// Whether `key` is registered.
    #[must_use]
    pub fn exist(&self, key: &MetricKey) -> bool {
        self.metrics.contains_key(key)
    }

    /// Remove a metric; absent keys are a no-op.
    pub fn del(&self, key: &MetricKey) -> Option<Metric> {
        let removed = self.metrics.remove(key).map(|(_, metric)| metric);
        if removed.is_some() {
            debug!(key = %key, "Deleted metric");
        }
        removed
    }

    /// Get or create a counter.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::InvalidIdentity`] for a blank name and
    /// [`TelemeterError::KindMismatch`] if the key holds another kind.
    pub fn counter(
        &self,
        name: impl Into<String>,
        tags: PointTags,
        initial: i64,
    ) -> TelemeterResult<Arc<Counter>> {
        let metric = self.get_or_insert_with(MetricKey::new(name, tags), |key| {
            Ok(Counter::new(key.clone(), initial).into())
        })?;

        match metric {
            Metric::Counter(counter) => Ok(counter),
            other => Err(kind_mismatch(&other, MetricKind::Counter)),
        }
    }

    /// Get or create a gauge.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::InvalidIdentity`] for a blank name and
    /// [`TelemeterError::KindMismatch`] if the key holds another kind.
    pub fn gauge(
        &self,
        name: impl Into<String>,
        tags: PointTags,
        initial: impl Into<f64>,
    ) -> TelemeterResult<Arc<Gauge>> {
        let initial = initial.into();
        let metric = self.get_or_insert_with(MetricKey::new(name, tags), |key| {
            Ok(Gauge::new(key.clone(), initial).into())
        })?;

        match metric {
            Metric::Gauge(gauge) => Ok(gauge),
            other => Err(kind_mismatch(&other, MetricKind::Gauge)),
        }
    }

    /// Get or create a windowed histogram.
    ///
    /// `config` and `clock` only matter when the histogram is created.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::InvalidIdentity`] for a blank name,
    /// [`TelemeterError::Config`] for an invalid `config`, and
    /// [`TelemeterError::KindMismatch`] if the key holds another kind.
    pub fn distribution(
        &self,
        name: impl Into<String>,
        tags: PointTags,
        config: &HistogramConfig,
        clock: Arc<dyn Clock>,
    ) -> TelemeterResult<Arc<Histogram>> {
        let metric = self.get_or_insert_with(MetricKey::new(name, tags), |key| {
            Histogram::new(key.clone(), config, clock).map(Metric::from)
        })?;

        match metric {
            Metric::Histogram(histogram) => Ok(histogram),
            other => Err(kind_mismatch(&other, MetricKind::Histogram)),
        }
    }

    /// Point-in-time copy of all registered metrics.
    #[must_use]
    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of registered metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Remove every metric.
    pub fn clear(&self) {
        self.metrics.clear();
        debug!("Cleared metrics registry");
    }

    fn get_or_insert_with(
        &self,
        key: MetricKey,
        create: impl FnOnce(&MetricKey) -> TelemeterResult<Metric>,
    ) -> TelemeterResult<Metric> {
        if !key.has_identity() {
            return Err(TelemeterError::InvalidIdentity(format!(
                "metric name must not be blank (key '{key}')"
            )));
        }

        match self.metrics.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(vacant) => {
                let metric = create(vacant.key())?;
                debug!(key = %vacant.key(), kind = %metric.kind(), "Registered metric");
                Ok(vacant.insert(metric).value().clone())
            }
        }
    }
}

fn kind_mismatch(found: &Metric, expected: MetricKind) -> TelemeterError {
    TelemeterError::KindMismatch {
        key: found.key().encoded().to_string(),
        expected,
        found: found.kind(),
    }
}
