//! Export step that walks a metrics registry
//!
//! Counters are sent as `<name>.count`, gauges as `<name>.value`, and each
//! histogram's flushed distributions under the histogram's own name. Every
//! point carries the configured source and the application tags, with the
//! application tags winning on key collision.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use telemeter_core::{Histogram, Metric, MetricsRegistry};
use telemeter_domain::constants::{COUNTER_SUFFIX, GAUGE_SUFFIX};
use telemeter_domain::{PointTags, ReporterConfig};
use tracing::{debug, instrument, warn};

use super::error::{ReportError, ReportResult};
use super::Report;
use crate::sender::{Sender, SenderResult};

/// Send outcomes of one cycle
#[derive(Debug, Default)]
struct CycleTally {
    attempted: usize,
    failed: usize,
}

impl CycleTally {
    fn record(&mut self, name: &str, result: SenderResult<()>) {
        self.attempted += 1;
        if let Err(err) = result {
            self.failed += 1;
            warn!(metric = name, error = %err, "Failed to send metric");
        }
    }
}

/// [`Report`] hook that exports a [`MetricsRegistry`] through a [`Sender`].
pub struct RegistryReporter {
    sender: Arc<dyn Sender>,
    registry: Arc<MetricsRegistry>,
    source: String,
    application_tags: PointTags,
}

impl RegistryReporter {
    /// Export step tagging points with `config.source` and
    /// `config.application_tags`.
    #[must_use]
    pub fn new(
        sender: Arc<dyn Sender>,
        registry: Arc<MetricsRegistry>,
        config: ReporterConfig,
    ) -> Self {
        Self {
            sender,
            registry,
            source: config.source,
            application_tags: config.application_tags,
        }
    }

    async fn report_histogram(&self, histogram: &Histogram, tags: &PointTags, tally: &mut CycleTally) {
        let name = histogram.key().name();
        for distribution in histogram.flush_distributions() {
            let granularities = BTreeSet::from([distribution.granularity]);
            let result = self
                .sender
                .send_distribution(
                    name,
                    &distribution.centroids,
                    &granularities,
                    distribution.timestamp_secs(),
                    &self.source,
                    tags,
                )
                .await;
            tally.record(name, result);
        }
    }
}

#[async_trait]
impl Report for RegistryReporter {
    #[instrument(skip(self))]
    #[allow(clippy::cast_precision_loss)]
    async fn report_now(&self) -> ReportResult<()> {
        let mut tally = CycleTally::default();

        for metric in self.registry.metrics() {
            let key = metric.key();
            let tags = self.application_tags.merged_over(key.tags());

            match &metric {
                Metric::Counter(counter) => {
                    let name = format!("{}.{COUNTER_SUFFIX}", key.name());
                    let result = self
                        .sender
                        .send_metric(&name, counter.value() as f64, None, &self.source, &tags)
                        .await;
                    tally.record(&name, result);
                }
                Metric::Gauge(gauge) => {
                    let name = format!("{}.{GAUGE_SUFFIX}", key.name());
                    let result =
                        self.sender.send_metric(&name, gauge.value(), None, &self.source, &tags).await;
                    tally.record(&name, result);
                }
                Metric::Histogram(histogram) => {
                    self.report_histogram(histogram, &tags, &mut tally).await;
                }
            }
        }

        debug!(attempted = tally.attempted, failed = tally.failed, "Reported registry");

        if tally.failed > 0 {
            return Err(ReportError::Partial { failed: tally.failed, attempted: tally.attempted });
        }
        Ok(())
    }
}
