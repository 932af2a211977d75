//! Integration tests for windowed histograms.

mod support;

use std::sync::Arc;
use std::thread;

use support::{
    assert_close, centroids, minute_histogram, pow10_histogram, weights_by_mean, MINUTE,
};
use telemeter_core::ShardHandle;
use telemeter_domain::Granularity;

#[test]
fn pow10_aggregates() {
    let histogram = pow10_histogram();

    assert_eq!(histogram.count(), 9);
    assert_close(histogram.sum(), 121_121.1);
    assert_close(histogram.mean().expect("non-empty"), 13_457.9);
    assert_close(histogram.min().expect("non-empty"), 0.1);
    assert_close(histogram.max().expect("non-empty"), 1e5);
}

#[test]
fn pow10_snapshot() {
    let histogram = pow10_histogram();
    let snapshot = histogram.snapshot();

    assert_eq!(snapshot.count(), 9);
    assert_close(snapshot.sum(), 121_121.1);
    assert_close(snapshot.mean().expect("non-empty"), 13_457.9);
    assert_close(snapshot.min().expect("non-empty"), 0.1);
    assert_close(snapshot.max().expect("non-empty"), 1e5);
    assert_close(snapshot.percentile(0.0).expect("non-empty"), 0.1);
    assert_close(snapshot.percentile(1.0).expect("non-empty"), 1e5);
    assert!(snapshot.percentiles().p50.is_some());
}

#[test]
fn pow10_flush() {
    let histogram = pow10_histogram();
    assert_eq!(histogram.count(), 9);

    let distributions = histogram.flush_distributions();

    assert_eq!(histogram.count(), 0);
    assert_eq!(histogram.snapshot().count(), 0);
    assert_eq!(distributions.len(), 1);
    assert_eq!(distributions[0].centroids.len(), 7);
    assert_eq!(distributions[0].granularity, Granularity::Minute);
    assert_eq!(distributions[0].timestamp_millis, 0);
}

#[test]
fn concurrent_centroid_merge_keeps_every_weight() {
    let (histogram, clock) = minute_histogram("merge");

    histogram
        .push_centroids(&centroids(&[(21.2, 70), (82.35, 2), (1042.0, 6)]))
        .expect("finite centroids");

    let writers: Vec<_> = [
        centroids(&[(24.2, 80), (84.35, 1), (1002.0, 9)]),
        centroids(&[(21.2, 60), (84.35, 12), (1052.0, 8)]),
    ]
    .into_iter()
    .map(|batch| {
        let histogram = Arc::clone(&histogram);
        thread::spawn(move || histogram.push_centroids(&batch).expect("finite centroids"))
    })
    .collect();
    for writer in writers {
        writer.join().expect("writer thread panicked");
    }

    clock.advance_millis(MINUTE + 1);
    let distributions = histogram.flush_distributions();

    // one distribution per writer thread
    assert_eq!(distributions.len(), 3);

    let gathered = weights_by_mean(&distributions);
    let expected: Vec<(&str, u64)> = vec![
        ("1002", 9),
        ("1042", 6),
        ("1052", 8),
        ("21.2", 130),
        ("24.2", 80),
        ("82.35", 2),
        ("84.35", 13),
    ];
    let gathered: Vec<(&str, u64)> = gathered.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    assert_eq!(gathered, expected);
}

#[test]
fn concurrent_pushes_are_recorded_exactly_once() {
    let (histogram, clock) = minute_histogram("load");

    let writers: Vec<_> = (0..8)
        .map(|worker| {
            let histogram = Arc::clone(&histogram);
            thread::spawn(move || {
                for i in 0..1_000 {
                    histogram.push(f64::from(worker * 1_000 + i)).expect("finite sample");
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().expect("writer thread panicked");
    }

    clock.advance_millis(MINUTE);
    assert_eq!(histogram.count(), 8_000);
    assert_eq!(histogram.flush_distributions().iter().map(|d| d.count()).sum::<u64>(), 8_000);
}

#[test]
fn writes_racing_rotation_are_never_lost() {
    let (histogram, clock) = minute_histogram("rotation");

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let histogram = Arc::clone(&histogram);
            thread::spawn(move || {
                for _ in 0..2_000 {
                    histogram.push(1.0).expect("finite sample");
                }
            })
        })
        .collect();

    let mut flushed = 0;
    for _ in 0..20 {
        clock.advance_millis(MINUTE);
        flushed += histogram.flush_distributions().iter().map(|d| d.count()).sum::<u64>();
    }
    for writer in writers {
        writer.join().expect("writer thread panicked");
    }

    clock.advance_millis(MINUTE);
    flushed += histogram.flush_distributions().iter().map(|d| d.count()).sum::<u64>();
    assert_eq!(flushed, 8_000);
}

#[test]
fn explicit_shards_route_task_writes() {
    let (histogram, clock) = minute_histogram("tasks");
    let shard = ShardHandle::next();

    let worker = {
        let histogram = Arc::clone(&histogram);
        thread::spawn(move || {
            histogram.push_to(shard, 1.0).expect("finite sample");
        })
    };
    worker.join().expect("writer thread panicked");
    histogram.push_to(shard, 2.0).expect("finite sample");

    clock.advance_millis(MINUTE);
    let distributions = histogram.flush_distributions();
    assert_eq!(distributions.len(), 1);
    assert_eq!(distributions[0].count(), 2);
}
