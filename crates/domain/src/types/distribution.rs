//! Exported histogram artifacts

use serde::{Deserialize, Serialize};

use super::Granularity;

/// A `(mean, weight)` pair summarising a cluster of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Mean of the clustered samples
    pub mean: f64,
    /// Number of samples in the cluster
    pub weight: u64,
}

impl Centroid {
    /// Centroid with the given mean and weight.
    #[must_use]
    pub const fn new(mean: f64, weight: u64) -> Self {
        Self { mean, weight }
    }
}

impl From<(f64, u64)> for Centroid {
    fn from((mean, weight): (f64, u64)) -> Self {
        Self { mean, weight }
    }
}

/// Centroids of one shard sketch of one time-window bin, ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Window start in epoch milliseconds
    pub timestamp_millis: u64,
    /// Width of the window
    pub granularity: Granularity,
    /// Ascending by mean
    pub centroids: Vec<Centroid>,
}

impl Distribution {
    /// Distribution for one window starting at `timestamp_millis`.
    #[must_use]
    pub fn new(timestamp_millis: u64, granularity: Granularity, centroids: Vec<Centroid>) -> Self {
        Self { timestamp_millis, granularity, centroids }
    }

    /// Window start in whole epoch seconds, as the proxy expects.
    #[must_use]
    pub const fn timestamp_secs(&self) -> u64 {
        self.timestamp_millis / 1000
    }

    /// Total number of samples the centroids summarise.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.centroids.iter().map(|c| c.weight).sum()
    }
}
