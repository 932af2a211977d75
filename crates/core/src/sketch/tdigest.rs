//! Merging t-digest
//!
//! Samples are buffered and folded into the sorted centroid list once the
//! buffer reaches `5 × compression` entries, or lazily on read. Neighbouring
//! centroids combine while the combined weight stays under the size bound
//! `4·N·q·(1−q) / compression`; centroids with identical means always
//! combine, which keeps repeated values exact.

use std::mem;

use telemeter_domain::Centroid;

use super::{Sketch, SketchFactory};

const BUFFER_FACTOR: usize = 5;

/// Merging t-digest with exact min and max.
#[derive(Debug, Clone)]
pub struct TDigest {
    compression: f64,
    centroids: Vec<Centroid>,
    buffer: Vec<Centroid>,
    count: u64,
    min: f64,
    max: f64,
}

impl TDigest {
    /// Empty digest; a `compression` of 0 is treated as 1.
    #[must_use]
    pub fn new(compression: u32) -> Self {
        Self {
            compression: f64::from(compression.max(1)),
            centroids: Vec::new(),
            buffer: Vec::new(),
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// True until a sample is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn buffer_limit(&self) -> usize {
        (self.compression as usize).saturating_mul(BUFFER_FACTOR).max(1)
    }

    fn record(&mut self, centroid: Centroid) {
        if centroid.weight == 0 || !centroid.mean.is_finite() {
            return;
        }
        self.min = self.min.min(centroid.mean);
        self.max = self.max.max(centroid.mean);
        self.count += centroid.weight;
        self.buffer.push(centroid);

        if self.buffer.len() >= self.buffer_limit() {
            self.compress();
        }
    }

    /// Fold buffered samples into the centroid list.
    #[allow(clippy::cast_precision_loss)]
    pub fn compress(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let mut all = mem::take(&mut self.centroids);
        all.append(&mut self.buffer);
        all.sort_by(|a, b| a.mean.total_cmp(&b.mean));

        let total = self.count as f64;
        let mut merged = Vec::with_capacity(all.len());
        let mut iter = all.into_iter();
        let Some(mut current) = iter.next() else {
            return;
        };
        let mut weight_before = 0.0;

        for next in iter {
            if next.mean == current.mean {
                current.weight += next.weight;
                continue;
            }

            let proposed = (current.weight + next.weight) as f64;
            let q = (weight_before + proposed / 2.0) / total;
            let bound = 4.0 * total * q * (1.0 - q) / self.compression;

            if proposed <= bound {
                current.mean += (next.mean - current.mean) * next.weight as f64 / proposed;
                current.weight += next.weight;
            } else {
                weight_before += current.weight as f64;
                merged.push(current);
                current = next;
            }
        }
        merged.push(current);

        self.centroids = merged;
    }

    #[allow(clippy::cast_precision_loss)]
    fn interpolate(&self, centroids: &[Centroid], p: f64) -> f64 {
        let total: f64 = centroids.iter().map(|c| c.weight as f64).sum();
        let target = p * total;

        let mut cumulative = 0.0;
        let mut previous: Option<(f64, f64)> = None;

        for centroid in centroids {
            let weight = centroid.weight as f64;
            let center = cumulative + weight / 2.0;

            if target < center {
                let (left_rank, left_value) = previous.unwrap_or((0.0, self.min));
                let t = (target - left_rank) / (center - left_rank);
                return left_value + t * (centroid.mean - left_value);
            }

            previous = Some((center, centroid.mean));
            cumulative += weight;
        }

        match previous {
            Some((center, value)) if total > center => {
                let t = (target - center) / (total - center);
                value + t * (self.max - value)
            }
            _ => self.max,
        }
    }
}

impl Sketch for TDigest {
    fn push(&mut self, value: f64) {
        self.record(Centroid::new(value, 1));
    }

    fn push_centroids(&mut self, centroids: &[Centroid]) {
        for centroid in centroids {
            self.record(*centroid);
        }
    }

    fn centroids(&self) -> Vec<Centroid> {
        if self.buffer.is_empty() {
            return self.centroids.clone();
        }
        let mut compressed = self.clone();
        compressed.compress();
        compressed.centroids
    }

    fn percentile(&self, p: f64) -> Option<f64> {
        if self.is_empty() || !(0.0..=1.0).contains(&p) {
            return None;
        }
        if p == 0.0 {
            return Some(self.min);
        }
        if p == 1.0 {
            return Some(self.max);
        }

        let centroids = self.centroids();
        if let [only] = centroids.as_slice() {
            return Some(only.mean);
        }

        Some(self.interpolate(&centroids, p).clamp(self.min, self.max))
    }

    fn size(&self) -> u64 {
        self.count
    }
}

/// Creates [`TDigest`] sketches.
#[derive(Debug, Clone, Copy, Default)]
pub struct TDigestFactory;

impl SketchFactory for TDigestFactory {
    fn create(&self, accuracy: u32) -> Box<dyn Sketch> {
        Box::new(TDigest::new(accuracy))
    }
}
