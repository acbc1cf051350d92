use std::time::Duration;

use crate::{
    clock::{Clock, MonotonicClock},
    config::TrackerConfig,
    error::Result,
    tracker::Tracker,
};

pub struct TrackerBuilder<C: Clock = MonotonicClock> {
    config: TrackerConfig,
    clock: C,
}

impl TrackerBuilder {
    pub fn new() -> Self {
        Self {
            config: TrackerConfig::default(),
            clock: MonotonicClock,
        }
    }
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TrackerBuilder<C> {
    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }
    pub fn with_retention_window(mut self, retention_window: Duration) -> Self {
        self.config.retention_window = retention_window;
        self
    }
    pub fn with_success_count_tolerance(mut self, tolerance: usize) -> Self {
        self.config.success_count_tolerance = tolerance;
        self
    }
    pub fn with_latency_tolerance(mut self, tolerance: Duration) -> Self {
        self.config.latency_tolerance = tolerance;
        self
    }
    /// Replaces the clock used to timestamp samples, e.g. with a [ManualClock](crate::ManualClock) in tests.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> TrackerBuilder<C2> {
        TrackerBuilder {
            config: self.config,
            clock,
        }
    }
    pub fn build(self) -> Result<Tracker<C>> {
        self.config.validate()?;
        Ok(Tracker::with_clock(self.config, self.clock))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{Error, ManualClock, Tracker};

    #[test]
    fn builder_overrides_defaults() {
        let tracker = Tracker::builder()
            .with_retention_window(Duration::from_secs(30))
            .with_success_count_tolerance(5)
            .with_latency_tolerance(Duration::from_millis(2))
            .with_clock(ManualClock::new())
            .build()
            .unwrap();
        let config = tracker.config();
        assert_eq!(config.retention_window, Duration::from_secs(30));
        assert_eq!(config.success_count_tolerance, 5);
        assert_eq!(config.latency_tolerance, Duration::from_millis(2));
    }

    #[test]
    fn builder_rejects_zero_retention_window() {
        let result = Tracker::builder()
            .with_retention_window(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
