//! Shared fixtures for `telemeter-core` integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use telemeter_core::{Histogram, MockClock};
use telemeter_domain::{Centroid, Distribution, HistogramConfig, MetricKey};

pub const MINUTE: u64 = 60_000;

/// Histogram with default settings driven by a mock clock starting at zero.
pub fn minute_histogram(name: &str) -> (Arc<Histogram>, MockClock) {
    let clock = MockClock::new(0);
    let histogram = Histogram::new(
        MetricKey::named(name),
        &HistogramConfig::default(),
        Arc::new(clock.clone()),
    )
    .expect("default histogram config is valid");
    (Arc::new(histogram), clock)
}

/// The classic powers-of-ten fixture, rotated into a past bin.
pub fn pow10_histogram() -> Arc<Histogram> {
    let (histogram, clock) = minute_histogram("pow10");
    for value in [0.1, 1.0, 1e1, 1e1, 1e2, 1e3, 1e4, 1e4, 1e5] {
        histogram.push(value).expect("finite sample");
    }
    clock.advance_millis(MINUTE + 1);
    histogram
}

pub fn centroids(pairs: &[(f64, u64)]) -> Vec<Centroid> {
    pairs.iter().copied().map(Centroid::from).collect()
}

/// Sum of weights per mean across all distributions.
pub fn weights_by_mean(distributions: &[Distribution]) -> BTreeMap<String, u64> {
    let mut gathered = BTreeMap::new();
    for centroid in distributions.iter().flat_map(|d| d.centroids.iter()) {
        *gathered.entry(centroid.mean.to_string()).or_insert(0) += centroid.weight;
    }
    gathered
}

pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = expected.abs().max(1.0) * 1e-9;
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}
