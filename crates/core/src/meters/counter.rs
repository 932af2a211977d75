use std::sync::atomic::{AtomicI64, Ordering};

use telemeter_domain::MetricKey;

/// Monotonic-by-convention signed counter.
#[derive(Debug)]
pub struct Counter {
    key: MetricKey,
    value: AtomicI64,
}

impl Counter {
    /// Counter starting at `initial`.
    #[must_use]
    pub fn new(key: MetricKey, initial: i64) -> Self {
        Self { key, value: AtomicI64::new(initial) }
    }

    /// Identity of this counter.
    #[must_use]
    pub fn key(&self) -> &MetricKey {
        &self.key
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Add one.
    pub fn inc(&self) {
        self.inc_by(1);
    }

    /// Add `delta`, which may be negative.
    pub fn inc_by(&self, delta: i64) {
        self.value.fetch_add(delta, Ordering::AcqRel);
    }
}
