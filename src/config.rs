use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_RETENTION_WINDOW: Duration = Duration::from_secs(2 * 60);
pub const DEFAULT_SUCCESS_COUNT_TOLERANCE: usize = 3;
pub const DEFAULT_LATENCY_TOLERANCE: Duration = Duration::from_millis(5);

/// Tunables of a single [Tracker](crate::Tracker).
///
/// With the `serde` feature enabled this can be deserialized, durations being expressed in milliseconds:
///
/// ```json
/// { "retention_window": 120000, "success_count_tolerance": 3, "latency_tolerance": 5 }
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    /// How long a sample stays eligible for ranking
    #[cfg_attr(
        feature = "serde",
        serde(with = "serde_with::As::<serde_with::DurationMilliSeconds<u64>>")
    )]
    pub retention_window: Duration,
    /// Sample count gap from which a more reliable peer outranks a faster one
    pub success_count_tolerance: usize,
    /// Average latency gap below which a more reliable peer outranks a faster one
    #[cfg_attr(
        feature = "serde",
        serde(with = "serde_with::As::<serde_with::DurationMilliSeconds<u64>>")
    )]
    pub latency_tolerance: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            retention_window: DEFAULT_RETENTION_WINDOW,
            success_count_tolerance: DEFAULT_SUCCESS_COUNT_TOLERANCE,
            latency_tolerance: DEFAULT_LATENCY_TOLERANCE,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.retention_window.is_zero() {
            return Err(Error::invalid_config("retention window must be non-zero"));
        }
        Ok(())
    }

    pub(crate) fn tolerances(&self) -> Tolerances {
        Tolerances {
            success_count: self.success_count_tolerance,
            latency: self.latency_tolerance,
        }
    }
}

/// The two thresholds used by the [ranking comparator](crate::tracker::ranking::before).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tolerances {
    pub success_count: usize,
    pub latency: Duration,
}

impl Default for Tolerances {
    fn default() -> Self {
        TrackerConfig::default().tolerances()
    }
}
