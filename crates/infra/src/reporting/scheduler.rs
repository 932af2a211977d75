//! Background reporting scheduler.
//!
//! Runs a [`Report`] hook every `reporting_interval` on a Tokio task with
//! start/stop lifecycle management. Failed cycles are logged and counted;
//! they never end the loop.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use telemeter_core::MetricsRegistry;
//! use telemeter_domain::{ReporterConfig, SenderConfig};
//! use telemeter_infra::{ProxySender, Reporter};
//!
//! # async fn example() -> Result<(), telemeter_infra::ReporterError> {
//! let registry = Arc::new(MetricsRegistry::new());
//! let sender = Arc::new(ProxySender::new(&SenderConfig::default()));
//! let config = ReporterConfig::default();
//! let stop_timeout = config.stop_timeout();
//!
//! let reporter = Reporter::for_registry(sender, registry, config);
//! reporter.start()?;
//! // ... application runs ...
//! reporter.stop(stop_timeout).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use telemeter_core::MetricsRegistry;
use telemeter_domain::ReporterConfig;
use tokio::runtime::Handle;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::error::{ReporterError, ReporterResult};
use super::{RegistryReporter, Report};
use crate::sender::Sender;

/// Counters describing the background loop so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReporterStats {
    /// Periodic cycles started
    pub cycles: u64,
    /// Periodic cycles that returned an error
    pub failures: u64,
}

#[derive(Debug, Default)]
struct LoopStats {
    cycles: AtomicU64,
    failures: AtomicU64,
}

/// State guarded by the lifecycle lock
#[derive(Debug, Default)]
struct TaskState {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

/// Periodic reporter
///
/// At most one `report_now` runs at a time: periodic cycles and the final
/// flush in [`Reporter::stop`] take the same cycle lock.
pub struct Reporter {
    hook: Arc<dyn Report>,
    interval: Duration,
    state: Mutex<TaskState>,
    cycle: Arc<AsyncMutex<()>>,
    stats: Arc<LoopStats>,
}

impl Reporter {
    /// Reporter that calls `hook` every `interval` once started.
    #[must_use]
    pub fn new(hook: Arc<dyn Report>, interval: Duration) -> Self {
        Self {
            hook,
            interval,
            state: Mutex::new(TaskState::default()),
            cycle: Arc::new(AsyncMutex::new(())),
            stats: Arc::new(LoopStats::default()),
        }
    }

    /// Reporter exporting `registry` through `sender`.
    #[must_use]
    pub fn for_registry(
        sender: Arc<dyn Sender>,
        registry: Arc<MetricsRegistry>,
        config: ReporterConfig,
    ) -> Self {
        let interval = config.reporting_interval();
        Self::new(Arc::new(RegistryReporter::new(sender, registry, config)), interval)
    }

    /// Start the background loop. Calling it while running is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ReporterError::NoRuntime`] outside a Tokio runtime.
    #[instrument(skip(self))]
    pub fn start(&self) -> ReporterResult<()> {
        let runtime = Handle::try_current().map_err(|_| ReporterError::NoRuntime)?;

        let mut state = self.state.lock();
        if state.handle.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Reporter already running");
            return Ok(());
        }

        // Fresh token so the reporter can be restarted after stop
        state.cancel = CancellationToken::new();

        let hook = Arc::clone(&self.hook);
        let cycle = Arc::clone(&self.cycle);
        let stats = Arc::clone(&self.stats);
        let cancel = state.cancel.clone();
        let interval = self.interval;

        state.handle = Some(runtime.spawn(async move {
            Self::report_loop(hook, interval, cancel, cycle, stats).await;
        }));

        info!(interval_ms = self.interval.as_millis(), "Reporter started");
        Ok(())
    }

    /// Stop the background loop, then run one final report.
    ///
    /// Waits up to `timeout` for the loop to exit. The final report runs
    /// whether or not the loop was running and whether or not it exited in
    /// time. If a periodic cycle is still in flight after the timeout, the
    /// final report waits for it to finish rather than overlapping it.
    ///
    /// # Errors
    ///
    /// [`ReporterError::FinalFlush`] if the final report fails, otherwise
    /// [`ReporterError::Timeout`] if the loop outlived `timeout`.
    #[instrument(skip(self))]
    pub async fn stop(&self, timeout: Duration) -> ReporterResult<()> {
        let handle = {
            let mut state = self.state.lock();
            state.cancel.cancel();
            state.handle.take()
        };

        let mut outcome = Ok(());
        if let Some(handle) = handle {
            match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(())) => debug!("Reporter loop exited"),
                Ok(Err(join_err)) => {
                    error!(error = %join_err, "Reporter task failed");
                    outcome = Err(ReporterError::TaskJoinFailed(join_err.to_string()));
                }
                Err(_) => {
                    warn!(timeout_ms = timeout.as_millis(), "Reporter loop did not exit in time");
                    outcome = Err(ReporterError::Timeout { duration: timeout });
                }
            }
        }

        let final_report = {
            let _cycle = self.cycle.lock().await;
            self.hook.report_now().await
        };
        if let Err(err) = final_report {
            error!(error = %err, "Final report failed");
            return Err(ReporterError::FinalFlush(err));
        }

        info!("Reporter stopped");
        outcome
    }

    /// Whether the background loop is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.lock().handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Loop counters since construction.
    #[must_use]
    pub fn stats(&self) -> ReporterStats {
        ReporterStats {
            cycles: self.stats.cycles.load(Ordering::Acquire),
            failures: self.stats.failures.load(Ordering::Acquire),
        }
    }

    /// Background loop. Cancellation is only observed while sleeping, so an
    /// in-flight report always completes.
    async fn report_loop(
        hook: Arc<dyn Report>,
        interval: Duration,
        cancel: CancellationToken,
        cycle: Arc<AsyncMutex<()>>,
        stats: Arc<LoopStats>,
    ) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Reporter loop cancelled");
                    break;
                }
                () = tokio::time::sleep(interval) => {
                    let started = Instant::now();
                    let cycle_no = stats.cycles.fetch_add(1, Ordering::AcqRel) + 1;

                    let result = {
                        let _cycle = cycle.lock().await;
                        hook.report_now().await
                    };
                    match result {
                        Ok(()) => debug!(
                            cycle = cycle_no,
                            elapsed_ms = started.elapsed().as_millis(),
                            "Report cycle complete"
                        ),
                        Err(err) => {
                            stats.failures.fetch_add(1, Ordering::AcqRel);
                            error!(cycle = cycle_no, error = %err, "Report cycle failed");
                        }
                    }
                }
            }
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.state.get_mut().cancel.cancel();
    }
}
