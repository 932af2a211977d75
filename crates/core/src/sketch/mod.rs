//! Mergeable quantile sketches
//!
//! Histograms only talk to [`Sketch`] and [`SketchFactory`]; the default
//! implementation is the merging [`TDigest`].

mod tdigest;

use std::fmt;

use telemeter_domain::Centroid;

pub use tdigest::{TDigest, TDigestFactory};

/// Additive, mergeable approximation of a value distribution.
pub trait Sketch: Send + Sync + fmt::Debug {
    /// Record one sample.
    fn push(&mut self, value: f64);

    /// Merge pre-aggregated `(mean, weight)` pairs.
    fn push_centroids(&mut self, centroids: &[Centroid]);

    /// Current centroids, ascending by mean.
    fn centroids(&self) -> Vec<Centroid>;

    /// Fold another sketch into this one.
    fn merge(&mut self, other: &dyn Sketch) {
        self.push_centroids(&other.centroids());
    }

    /// Value below which a fraction `p` of the samples fall.
    ///
    /// `None` when empty or when `p` is outside `[0, 1]`.
    fn percentile(&self, p: f64) -> Option<f64>;

    /// Total weight recorded.
    fn size(&self) -> u64;
}

/// Builds empty sketches with a given accuracy (compression).
pub trait SketchFactory: Send + Sync + fmt::Debug {
    /// Fresh, empty sketch.
    fn create(&self, accuracy: u32) -> Box<dyn Sketch>;
}
