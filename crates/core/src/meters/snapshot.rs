//! Read-only view of a histogram's retained data

use std::fmt;

use telemeter_domain::Centroid;

use crate::sketch::Sketch;

/// Merge of every shard sketch of every retained past bin.
///
/// Building one does not disturb the histogram; the snapshot owns its own
/// sketch.
#[derive(Debug)]
pub struct Snapshot {
    sketch: Box<dyn Sketch>,
    centroids: Vec<Centroid>,
}

impl Snapshot {
    pub(crate) fn new(sketch: Box<dyn Sketch>) -> Self {
        let centroids = sketch.centroids();
        Self { sketch, centroids }
    }

    /// Number of recorded values.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.sketch.size()
    }

    /// Σ mean × weight over all centroids.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.centroids.iter().map(|c| c.mean * c.weight as f64).sum()
    }

    /// Arithmetic mean; `None` when empty.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        match self.count() {
            0 => None,
            count => Some(self.sum() / count as f64),
        }
    }

    /// Smallest recorded value.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.centroids.first().map(|c| c.mean)
    }

    /// Largest recorded value.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.centroids.last().map(|c| c.mean)
    }

    /// Value at fraction `p` in `[0, 1]`; `None` when empty or out of range.
    #[must_use]
    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.sketch.percentile(p)
    }

    /// Merged centroids, ascending by mean.
    #[must_use]
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// Common percentiles (p50, p95, p99, p999)
    #[must_use]
    pub fn percentiles(&self) -> Percentiles {
        Percentiles {
            p50: self.percentile(0.50),
            p95: self.percentile(0.95),
            p99: self.percentile(0.99),
            p999: self.percentile(0.999),
        }
    }

    /// Human-readable one-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        if self.count() == 0 {
            return "No measurements recorded".to_string();
        }

        format!(
            "count={}, mean={}, min={}, max={}, p50={}, p99={}",
            self.count(),
            fmt_opt(self.mean()),
            fmt_opt(self.min()),
            fmt_opt(self.max()),
            fmt_opt(self.percentile(0.5)),
            fmt_opt(self.percentile(0.99)),
        )
    }
}

/// Common percentile values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentiles {
    /// Median
    pub p50: Option<f64>,
    /// 95th percentile
    pub p95: Option<f64>,
    /// 99th percentile
    pub p99: Option<f64>,
    /// 99.9th percentile
    pub p999: Option<f64>,
}

impl fmt::Display for Percentiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p50={}, p95={}, p99={}, p999={}",
            fmt_opt(self.p50),
            fmt_opt(self.p95),
            fmt_opt(self.p99),
            fmt_opt(self.p999)
        )
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}
