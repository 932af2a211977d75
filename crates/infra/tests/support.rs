//! Shared fakes for `telemeter-infra` integration tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use telemeter_domain::{Centroid, Granularity, PointTags};
use telemeter_infra::{Report, ReportError, ReportResult, Sender, SenderError, SenderResult};

/// A call captured by [`RecordingSender`].
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Metric { name: String, value: f64, source: String, tags: PointTags },
    Distribution {
        name: String,
        centroids: Vec<Centroid>,
        granularities: Vec<Granularity>,
        timestamp_secs: u64,
        source: String,
        tags: PointTags,
    },
}

impl Sent {
    pub fn name(&self) -> &str {
        match self {
            Self::Metric { name, .. } | Self::Distribution { name, .. } => name,
        }
    }
}

/// Sender that records every call and fails on selected names.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Sent>>,
    failing: HashSet<String>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(names: &[&str]) -> Self {
        Self { sent: Mutex::default(), failing: names.iter().map(ToString::to_string).collect() }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }

    fn check(&self, name: &str) -> SenderResult<()> {
        if self.failing.contains(name) {
            return Err(SenderError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "scripted failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl Sender for RecordingSender {
    async fn send_metric(
        &self,
        name: &str,
        value: f64,
        _timestamp_millis: Option<u64>,
        source: &str,
        tags: &PointTags,
    ) -> SenderResult<()> {
        self.check(name)?;
        self.sent.lock().expect("sent mutex poisoned").push(Sent::Metric {
            name: name.to_string(),
            value,
            source: source.to_string(),
            tags: tags.clone(),
        });
        Ok(())
    }

    async fn send_distribution(
        &self,
        name: &str,
        centroids: &[Centroid],
        granularities: &BTreeSet<Granularity>,
        timestamp_secs: u64,
        source: &str,
        tags: &PointTags,
    ) -> SenderResult<()> {
        self.check(name)?;
        self.sent.lock().expect("sent mutex poisoned").push(Sent::Distribution {
            name: name.to_string(),
            centroids: centroids.to_vec(),
            granularities: granularities.iter().copied().collect(),
            timestamp_secs,
            source: source.to_string(),
            tags: tags.clone(),
        });
        Ok(())
    }
}

/// Report hook that counts calls, optionally failing or taking time.
#[derive(Debug, Default)]
pub struct ScriptedReport {
    started: AtomicUsize,
    completed: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    fail: AtomicBool,
    delay: Duration,
}

impl ScriptedReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay, ..Self::default() }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Highest number of reports seen running at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Report for ScriptedReport {
    async fn report_now(&self) -> ReportResult<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(ReportError::Partial { failed: 1, attempted: 1 });
        }
        Ok(())
    }
}
