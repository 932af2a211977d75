//! Histogram time-window sizes

use serde::{Deserialize, Serialize};

use crate::constants::{DAY_MILLIS, HOUR_MILLIS, MINUTE_MILLIS};
use crate::impl_enum_conversions;

/// Size of the time window a histogram bin covers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One-minute windows
    #[default]
    Minute,
    /// One-hour windows
    Hour,
    /// One-day windows
    Day,
}

impl_enum_conversions!(Granularity {
    Minute => "minute",
    Hour => "hour",
    Day => "day",
});

impl Granularity {
    /// Window width in milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        match self {
            Self::Minute => MINUTE_MILLIS,
            Self::Hour => HOUR_MILLIS,
            Self::Day => DAY_MILLIS,
        }
    }

    /// Start of the window containing `millis` (epoch milliseconds).
    #[must_use]
    pub const fn truncate(self, millis: u64) -> u64 {
        millis - millis % self.as_millis()
    }
}
