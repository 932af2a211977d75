//! Wall-clock abstraction for histogram bin rotation
//!
//! Histograms read the time through [`Clock`] so tests can drive bin
//! rotation deterministically with [`MockClock`].
//!
//! ```
//! use std::time::Duration;
//!
//! use telemeter_core::clock::{Clock, MockClock};
//!
//! let clock = MockClock::new(60_000);
//! clock.advance(Duration::from_secs(30));
//! assert_eq!(clock.now_millis(), 90_000);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync + 'static {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_millis(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }
}

/// Any `Fn() -> u64` closure can stand in for a clock.
impl<F> Clock for F
where
    F: Fn() -> u64 + Send + Sync + 'static,
{
    fn now_millis(&self) -> u64 {
        self()
    }
}

/// Manually driven clock for tests.
///
/// Clones share the same underlying time, so a test can hand one clone to a
/// histogram and keep another to advance it.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    millis: Arc<AtomicU64>,
}

impl MockClock {
    /// Clock frozen at `start_millis` until advanced.
    #[must_use]
    pub fn new(start_millis: u64) -> Self {
        Self { millis: Arc::new(AtomicU64::new(start_millis)) }
    }

    /// Move time forward by `by`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn advance(&self, by: Duration) {
        self.advance_millis(by.as_millis() as u64);
    }

    /// Move time forward by `by` milliseconds.
    pub fn advance_millis(&self, by: u64) {
        self.millis.fetch_add(by, Ordering::SeqCst);
    }

    /// Jump to an absolute time.
    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}
