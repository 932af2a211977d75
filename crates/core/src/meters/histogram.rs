//! Time-windowed, thread-sharded distribution
//!
//! A [`Histogram`] keeps one *current* bin covering the granularity window
//! that contains "now", plus up to `max_bins` retired *past* bins. Each bin
//! maps a [`ShardHandle`] to its own sketch, so concurrent writers on
//! different threads never contend on a single sketch.
//!
//! Reads (`count`, `sum`, `snapshot`, `flush_distributions`, ...) only see
//! past bins; data pushed into the current window becomes visible once the
//! clock moves into the next window.
//!
//! ```
//! use std::sync::Arc;
//!
//! use telemeter_core::clock::MockClock;
//! use telemeter_core::Histogram;
//! use telemeter_domain::{HistogramConfig, MetricKey};
//!
//! let clock = MockClock::new(0);
//! let histogram =
//!     Histogram::new(MetricKey::named("latency"), &HistogramConfig::default(), Arc::new(clock.clone()))
//!         .expect("default config is valid");
//!
//! histogram.push(12.5).expect("finite sample");
//! assert_eq!(histogram.count(), 0);
//!
//! clock.advance_millis(60_000);
//! assert_eq!(histogram.count(), 1);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use telemeter_domain::{
    Centroid, Distribution, Granularity, HistogramConfig, MetricKey, TelemeterError,
    TelemeterResult,
};
use tracing::debug;

use super::shard::ShardHandle;
use super::snapshot::Snapshot;
use crate::clock::Clock;
use crate::sketch::{Sketch, SketchFactory, TDigestFactory};

/// One granularity window: shard handle -> sketch, created lazily.
#[derive(Debug)]
struct Bin {
    gtime: u64,
    shards: DashMap<ShardHandle, Box<dyn Sketch>>,
}

impl Bin {
    fn new(gtime: u64) -> Self {
        Self { gtime, shards: DashMap::new() }
    }

    fn record(
        &self,
        shard: ShardHandle,
        factory: &dyn SketchFactory,
        accuracy: u32,
        write: impl FnOnce(&mut dyn Sketch),
    ) {
        let mut sketch = self.shards.entry(shard).or_insert_with(|| factory.create(accuracy));
        write(sketch.value_mut().as_mut());
    }

    /// One distribution per non-empty shard, ordered by shard handle.
    fn distributions(&self, granularity: Granularity) -> Vec<Distribution> {
        let mut shards: Vec<(ShardHandle, Vec<Centroid>)> =
            self.shards.iter().map(|entry| (*entry.key(), entry.value().centroids())).collect();
        shards.sort_by_key(|(shard, _)| *shard);

        shards
            .into_iter()
            .filter(|(_, centroids)| !centroids.is_empty())
            .map(|(_, centroids)| Distribution::new(self.gtime, granularity, centroids))
            .collect()
    }
}

/// Windowed, sharded distribution metric.
///
/// See the [module docs](self) for the bin lifecycle.
pub struct Histogram {
    key: MetricKey,
    accuracy: u32,
    granularity: Granularity,
    max_bins: usize,
    clock: Arc<dyn Clock>,
    factory: Arc<dyn SketchFactory>,
    /// Window start of the current bin, read on the lock-free fast path
    current_gtime: AtomicU64,
    current: RwLock<Arc<Bin>>,
    /// Past bins, oldest first. This mutex also serialises rotation and flush.
    past: Mutex<VecDeque<Arc<Bin>>>,
}

impl Histogram {
    /// Histogram backed by t-digest sketches.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::Config`] if `config` fails validation.
    pub fn new(
        key: MetricKey,
        config: &HistogramConfig,
        clock: Arc<dyn Clock>,
    ) -> TelemeterResult<Self> {
        Self::with_factory(key, config, clock, Arc::new(TDigestFactory))
    }

    /// Histogram whose shard sketches come from `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::Config`] if `config` fails validation.
    pub fn with_factory(
        key: MetricKey,
        config: &HistogramConfig,
        clock: Arc<dyn Clock>,
        factory: Arc<dyn SketchFactory>,
    ) -> TelemeterResult<Self> {
        config.validate()?;

        let gtime = config.granularity.truncate(clock.now_millis());
        Ok(Self {
            key,
            accuracy: config.accuracy,
            granularity: config.granularity,
            max_bins: config.max_bins,
            clock,
            factory,
            current_gtime: AtomicU64::new(gtime),
            current: RwLock::new(Arc::new(Bin::new(gtime))),
            past: Mutex::new(VecDeque::new()),
        })
    }

    /// Identity of this histogram.
    #[must_use]
    pub fn key(&self) -> &MetricKey {
        &self.key
    }

    /// Window width used to bucket samples.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Compression setting passed to each window's sketch.
    #[must_use]
    pub const fn accuracy(&self) -> u32 {
        self.accuracy
    }

    /// Upper bound on centroids reported per window.
    #[must_use]
    pub const fn max_bins(&self) -> usize {
        self.max_bins
    }

    /// Retired bins currently retained, after rotating to the clock.
    #[must_use]
    pub fn past_bin_count(&self) -> usize {
        self.rotate();
        self.past.lock().len()
    }

    /// Record one sample from the calling thread's shard.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::InvalidInput`] for NaN or infinite samples;
    /// nothing is recorded.
    pub fn push(&self, value: f64) -> TelemeterResult<()> {
        self.push_to(ShardHandle::current(), value)
    }

    /// Record one sample into an explicit shard.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::InvalidInput`] for NaN or infinite samples.
    pub fn push_to(&self, shard: ShardHandle, value: f64) -> TelemeterResult<()> {
        if !value.is_finite() {
            return Err(TelemeterError::InvalidInput(format!(
                "histogram '{}' rejects non-finite sample {value}",
                self.key
            )));
        }
        self.record(shard, |sketch| sketch.push(value));
        Ok(())
    }

    /// Merge pre-aggregated centroids from the calling thread's shard.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::InvalidInput`] if any centroid mean is not
    /// finite; none of the batch is recorded.
    pub fn push_centroids(&self, centroids: &[Centroid]) -> TelemeterResult<()> {
        self.push_centroids_to(ShardHandle::current(), centroids)
    }

    /// Merge pre-aggregated centroids into an explicit shard.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::InvalidInput`] if any centroid mean is not
    /// finite.
    pub fn push_centroids_to(
        &self,
        shard: ShardHandle,
        centroids: &[Centroid],
    ) -> TelemeterResult<()> {
        if let Some(bad) = centroids.iter().find(|c| !c.mean.is_finite()) {
            return Err(TelemeterError::InvalidInput(format!(
                "histogram '{}' rejects non-finite centroid mean {}",
                self.key, bad.mean
            )));
        }
        if centroids.is_empty() {
            return Ok(());
        }
        self.record(shard, |sketch| sketch.push_centroids(centroids));
        Ok(())
    }

    /// Drain all past bins into distributions, one per shard per bin.
    ///
    /// Output is ordered by bin age, then shard handle. The current bin is
    /// left untouched.
    #[must_use]
    pub fn flush_distributions(&self) -> Vec<Distribution> {
        self.rotate();
        let bins: Vec<Arc<Bin>> = self.past.lock().drain(..).collect();

        let distributions: Vec<Distribution> =
            bins.iter().flat_map(|bin| bin.distributions(self.granularity)).collect();

        debug!(
            key = %self.key,
            bins = bins.len(),
            distributions = distributions.len(),
            "Flushed histogram"
        );
        distributions
    }

    /// Merge every retained past bin into a fresh sketch.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut merged = self.factory.create(self.accuracy);
        for bin in self.retained() {
            for shard in bin.shards.iter() {
                merged.merge(shard.value().as_ref());
            }
        }
        Snapshot::new(merged)
    }

    /// Values retained in past bins.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.fold_sketches(0, |count, sketch| count + sketch.size())
    }

    /// Σ mean × weight over retained past bins.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.fold_sketches(0.0, |sum, sketch| {
            sum + sketch.centroids().iter().map(|c| c.mean * c.weight as f64).sum::<f64>()
        })
    }

    /// Mean of retained values; `None` when empty.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self.fold_sketches((0.0, 0_u64), |(sum, count), sketch| {
            let centroids = sketch.centroids();
            let partial: f64 = centroids.iter().map(|c| c.mean * c.weight as f64).sum();
            (sum + partial, count + sketch.size())
        });
        (count > 0).then(|| sum / count as f64)
    }

    /// Smallest retained value.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.fold_sketches(None, |min: Option<f64>, sketch| {
            match (min, sketch.centroids().first().map(|c| c.mean)) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            }
        })
    }

    /// Largest retained value.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.fold_sketches(None, |max: Option<f64>, sketch| {
            match (max, sketch.centroids().last().map(|c| c.mean)) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            }
        })
    }

    fn record(&self, shard: ShardHandle, write: impl FnOnce(&mut dyn Sketch)) {
        self.rotate();
        // Holding the read guard keeps this bin current until the write lands.
        let bin = self.current.read();
        bin.record(shard, self.factory.as_ref(), self.accuracy, write);
    }

    fn granular_now(&self) -> u64 {
        self.granularity.truncate(self.clock.now_millis())
    }

    /// Retire the current bin if the clock has left its window.
    fn rotate(&self) {
        if self.current_gtime.load(Ordering::Acquire) == self.granular_now() {
            return;
        }

        let mut past = self.past.lock();
        let gnow = self.granular_now();
        if self.current_gtime.load(Ordering::Acquire) == gnow {
            return;
        }

        let retired = {
            let mut current = self.current.write();
            mem::replace(&mut *current, Arc::new(Bin::new(gnow)))
        };
        self.current_gtime.store(gnow, Ordering::Release);

        debug!(key = %self.key, retired = retired.gtime, current = gnow, "Rotated histogram bin");

        past.push_back(retired);
        while past.len() > self.max_bins {
            past.pop_front();
        }
    }

    fn retained(&self) -> Vec<Arc<Bin>> {
        self.rotate();
        self.past.lock().iter().cloned().collect()
    }

    fn fold_sketches<T>(&self, init: T, mut f: impl FnMut(T, &dyn Sketch) -> T) -> T {
        let mut acc = init;
        for bin in self.retained() {
            for shard in bin.shards.iter() {
                acc = f(acc, shard.value().as_ref());
            }
        }
        acc
    }
}

impl fmt::Debug for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Histogram")
            .field("key", &self.key)
            .field("accuracy", &self.accuracy)
            .field("granularity", &self.granularity)
            .field("max_bins", &self.max_bins)
            .field("current_gtime", &self.current_gtime.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;

    fn histogram_with(config: HistogramConfig, start: u64) -> (Histogram, MockClock) {
        let clock = MockClock::new(start);
        let histogram =
            Histogram::new(MetricKey::named("test.histogram"), &config, Arc::new(clock.clone()))
                .expect("valid config");
        (histogram, clock)
    }

    #[test]
    fn current_bin_is_invisible_until_rotation() {
        let (histogram, clock) = histogram_with(HistogramConfig::default(), 1_000);

        histogram.push(1.0).expect("finite");
        assert_eq!(histogram.count(), 0);
        assert_eq!(histogram.mean(), None);

        clock.advance_millis(59_000);
        assert_eq!(histogram.count(), 1);
        assert_eq!(histogram.past_bin_count(), 1);
    }

    #[test]
    fn past_bins_are_bounded() {
        let config = HistogramConfig { max_bins: 3, ..HistogramConfig::default() };
        let (histogram, clock) = histogram_with(config, 0);

        for minute in 0..6 {
            histogram.push(f64::from(minute)).expect("finite");
            clock.advance_millis(60_000);
        }

        assert_eq!(histogram.past_bin_count(), 3);
        assert_eq!(histogram.count(), 3);
        assert_eq!(histogram.min(), Some(3.0));
        assert_eq!(histogram.max(), Some(5.0));
    }

    #[test]
    fn rejects_non_finite_samples() {
        let (histogram, clock) = histogram_with(HistogramConfig::default(), 0);

        assert!(matches!(histogram.push(f64::NAN), Err(TelemeterError::InvalidInput(_))));
        assert!(histogram.push(f64::INFINITY).is_err());
        assert!(histogram.push_centroids(&[Centroid::new(f64::NEG_INFINITY, 1)]).is_err());

        clock.advance_millis(60_000);
        assert_eq!(histogram.count(), 0);
    }

    #[test]
    fn flush_keeps_shards_separate() {
        let (histogram, clock) = histogram_with(HistogramConfig::default(), 0);
        let first = ShardHandle::next();
        let second = ShardHandle::next();

        histogram.push_to(second, 2.0).expect("finite");
        histogram.push_to(first, 1.0).expect("finite");
        histogram.push_to(first, 1.0).expect("finite");
        clock.advance_millis(60_000);
        histogram.push_to(first, 3.0).expect("finite");
        clock.advance_millis(60_000);

        let distributions = histogram.flush_distributions();
        assert_eq!(distributions.len(), 3);
        assert_eq!(distributions[0].timestamp_millis, 0);
        assert_eq!(distributions[0].centroids, vec![Centroid::new(1.0, 2)]);
        assert_eq!(distributions[1].timestamp_millis, 0);
        assert_eq!(distributions[1].centroids, vec![Centroid::new(2.0, 1)]);
        assert_eq!(distributions[2].timestamp_millis, 60_000);

        assert_eq!(histogram.count(), 0);
        assert!(histogram.flush_distributions().is_empty());
    }

    #[test]
    fn flush_leaves_current_bin_alone() {
        let (histogram, clock) = histogram_with(HistogramConfig::default(), 0);

        histogram.push(5.0).expect("finite");
        assert!(histogram.flush_distributions().is_empty());

        clock.advance_millis(60_000);
        let distributions = histogram.flush_distributions();
        assert_eq!(distributions.len(), 1);
        assert_eq!(distributions[0].count(), 1);
    }

    #[test]
    fn snapshot_does_not_consume() {
        let (histogram, clock) = histogram_with(HistogramConfig::default(), 0);
        for value in [1.0, 2.0, 3.0, 4.0] {
            histogram.push(value).expect("finite");
        }
        clock.advance_millis(60_000);

        let snapshot = histogram.snapshot();
        assert_eq!(snapshot.count(), 4);
        assert_eq!(snapshot.min(), Some(1.0));
        assert_eq!(snapshot.max(), Some(4.0));
        assert_eq!(histogram.count(), 4);
    }

    #[test]
    fn hour_granularity_truncates_to_the_hour() {
        let config = HistogramConfig { granularity: Granularity::Hour, ..HistogramConfig::default() };
        let (histogram, clock) = histogram_with(config, 3_600_000 + 42);

        histogram.push(1.0).expect("finite");
        clock.advance_millis(3_600_000);

        let distributions = histogram.flush_distributions();
        assert_eq!(distributions[0].timestamp_millis, 3_600_000);
        assert_eq!(distributions[0].granularity, Granularity::Hour);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = HistogramConfig { accuracy: 0, ..HistogramConfig::default() };
        let result = Histogram::new(MetricKey::named("x"), &config, Arc::new(MockClock::new(0)));
        assert!(matches!(result, Err(TelemeterError::Config(_))));
    }
}
