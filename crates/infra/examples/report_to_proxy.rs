//! Records a few metrics and ships them to a local Wavefront proxy.
//!
//! ```text
//! cargo run -p telemeter-infra --example report_to_proxy
//! ```
//!
//! Settings come from `TELEMETER_*` variables or a `telemeter.toml` next to
//! the working directory, falling back to defaults.

use std::sync::Arc;

use telemeter_core::{MetricsRegistry, SystemClock};
use telemeter_domain::{PointTags, TelemeterConfig, TelemeterResult};
use telemeter_infra::observability::init_tracing;
use telemeter_infra::{config, ProxySender, Reporter};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> TelemeterResult<()> {
    let config = config::load().unwrap_or_else(|_| TelemeterConfig::default());
    init_tracing(&config.logging)?;

    let registry = MetricsRegistry::global();
    let tags = PointTags::new().with("endpoint", "/checkout");
    let requests = registry.counter("requests", tags.clone(), 0)?;
    let in_flight = registry.gauge("in_flight", tags.clone(), 0.0)?;
    let latency =
        registry.distribution("latency_ms", tags, &config.histogram, Arc::new(SystemClock))?;

    let sender = Arc::new(ProxySender::new(&config.sender));
    let reporter = Reporter::for_registry(sender, Arc::clone(&registry), config.reporter.clone());
    reporter.start()?;

    for i in 0..50u32 {
        requests.inc();
        in_flight.set(f64::from(i % 7));
        latency.push(f64::from(10 + i % 13))?;
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    info!(summary = %latency.snapshot().summary(), "Recorded latency");

    if let Err(err) = reporter.stop(config.reporter.stop_timeout()).await {
        warn!(error = %err, "Reporter did not stop cleanly");
    }
    Ok(())
}
