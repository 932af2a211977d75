use std::sync::atomic::{AtomicU64, Ordering};

use telemeter_domain::MetricKey;

/// Last-write-wins floating point gauge.
///
/// The value is kept as raw `f64` bits in one `AtomicU64`, so reads never
/// observe a torn write.
#[derive(Debug)]
pub struct Gauge {
    key: MetricKey,
    bits: AtomicU64,
}

impl Gauge {
    /// Gauge holding `initial`.
    #[must_use]
    pub fn new(key: MetricKey, initial: f64) -> Self {
        Self { key, bits: AtomicU64::new(initial.to_bits()) }
    }

    /// Identity of this gauge.
    #[must_use]
    pub fn key(&self) -> &MetricKey {
        &self.key
    }

    /// Most recently set value.
    #[must_use]
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Replace the value; integers are widened to `f64`.
    pub fn set(&self, value: impl Into<f64>) {
        self.bits.store(value.into().to_bits(), Ordering::Release);
    }
}
