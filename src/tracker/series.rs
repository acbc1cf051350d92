use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use log::trace;

use super::PeerSummary;
use crate::peer::PeerKey;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// One measured round-trip time and the instant it was recorded at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub timestamp: Instant,
    pub latency: Duration,
}

/// The sliding window of a single peer's samples.
///
/// Samples are only ever appended at the back with the current instant, so the deque is sorted by
/// timestamp and eviction only needs to pop from the front until it meets a sample that is still
/// inside the retention window.
#[derive(Clone, Debug)]
pub struct Series {
    key: PeerKey,
    retention_window: Duration,
    samples: VecDeque<Sample>,
    // running sum of the retained latencies
    total_latency: Duration,
}

impl Series {
    pub(crate) fn new(key: PeerKey, retention_window: Duration) -> Self {
        Self {
            key,
            retention_window,
            samples: VecDeque::new(),
            total_latency: Duration::ZERO,
        }
    }

    pub fn key(&self) -> &PeerKey {
        &self.key
    }

    pub(crate) fn add(&mut self, now: Instant, latency: Duration) {
        debug_assert!(self
            .samples
            .back()
            .map(|last| last.timestamp <= now)
            .unwrap_or(true));

        self.samples.push_back(Sample {
            timestamp: now,
            latency,
        });
        self.total_latency = self.total_latency.saturating_add(latency);
        self.evict_expired(now);
    }

    /// Drops every sample older than `now - retention_window` and returns how many were dropped.
    pub(crate) fn evict_expired(&mut self, now: Instant) -> usize {
        let cutoff = match now.checked_sub(self.retention_window) {
            Some(cutoff) => cutoff,
            None => return 0,
        };
        let mut evicted = 0;
        while let Some(oldest) = self.samples.front() {
            if oldest.timestamp >= cutoff {
                break;
            }
            self.total_latency = self.total_latency.saturating_sub(oldest.latency);
            self.samples.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            trace!("Evicted {} expired samples of peer {}", evicted, self.key);
        }
        evicted
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean latency of the retained samples, or [None] when the window holds no sample.
    pub fn average_latency(&self) -> Option<Duration> {
        match self.samples.len() {
            0 => None,
            count => {
                let mean_nanos = self.total_latency.as_nanos() / count as u128;
                Some(Duration::new(
                    (mean_nanos / NANOS_PER_SEC) as u64,
                    (mean_nanos % NANOS_PER_SEC) as u32,
                ))
            }
        }
    }

    pub fn min_latency(&self) -> Option<Duration> {
        self.samples.iter().map(|s| s.latency).min()
    }

    pub fn max_latency(&self) -> Option<Duration> {
        self.samples.iter().map(|s| s.latency).max()
    }

    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn summary(&self) -> PeerSummary {
        PeerSummary {
            peer: self.key.clone(),
            sample_count: self.sample_count(),
            average_latency: self.average_latency(),
            min_latency: self.min_latency(),
            max_latency: self.max_latency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use quickcheck::{Arbitrary, Gen};

    use super::Series;
    use crate::peer::PeerKey;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn secs(secs: u64) -> Duration {
        Duration::from_secs(secs)
    }

    #[test]
    fn empty_series_has_no_average() {
        let series = Series::new(PeerKey::from("a"), secs(120));
        assert_eq!(series.sample_count(), 0);
        assert_eq!(series.average_latency(), None);
        assert_eq!(series.min_latency(), None);
        assert_eq!(series.max_latency(), None);
    }

    #[test]
    fn add_evicts_samples_older_than_the_window() {
        let start = Instant::now();
        let mut series = Series::new(PeerKey::from("a"), secs(60));

        series.add(start, ms(10));
        series.add(start + secs(30), ms(20));
        assert_eq!(series.sample_count(), 2);
        assert_eq!(series.average_latency(), Some(ms(15)));

        series.add(start + secs(61), ms(30));
        assert_eq!(series.sample_count(), 2);
        assert_eq!(series.average_latency(), Some(ms(25)));
        assert_eq!(series.min_latency(), Some(ms(20)));
        assert_eq!(series.max_latency(), Some(ms(30)));
    }

    #[test]
    fn sample_exactly_at_the_window_edge_is_retained() {
        let start = Instant::now();
        let mut series = Series::new(PeerKey::from("a"), secs(60));
        series.add(start, ms(10));
        series.add(start + secs(60), ms(20));
        assert_eq!(series.sample_count(), 2);
    }

    #[test]
    fn evict_expired_can_empty_the_series() {
        let start = Instant::now();
        let mut series = Series::new(PeerKey::from("a"), secs(60));
        series.add(start, ms(10));
        series.add(start + secs(1), ms(12));

        assert_eq!(series.evict_expired(start + secs(300)), 2);
        assert!(series.is_empty());
        assert_eq!(series.average_latency(), None);

        series.add(start + secs(301), ms(40));
        assert_eq!(series.average_latency(), Some(ms(40)));
    }

    #[test]
    fn average_of_huge_latencies_is_exact() {
        let start = Instant::now();
        let mut series = Series::new(PeerKey::from("a"), secs(60));
        series.add(start, secs(1 << 40));
        series.add(start, secs(1 << 40));
        assert_eq!(series.average_latency(), Some(secs(1 << 40)));

        series.add(start, secs(1 << 40) + Duration::from_nanos(3));
        assert_eq!(
            series.average_latency(),
            Some(secs(1 << 40) + Duration::from_nanos(1))
        );
    }

    /// A sequence of (delay since previous sample, latency) pairs, in seconds and milliseconds
    #[derive(Clone, Debug)]
    struct SampleScript(Vec<(u8, u16)>);

    impl Arbitrary for SampleScript {
        fn arbitrary(g: &mut Gen) -> Self {
            SampleScript(Vec::<(u8, u16)>::arbitrary(g))
        }
    }

    #[quickcheck]
    fn retained_samples_are_always_inside_the_window(script: SampleScript, window: u8) -> bool {
        let window = secs(window as u64 + 1);
        let mut now = Instant::now();
        let mut series = Series::new(PeerKey::from("a"), window);

        script.0.into_iter().all(|(delay, latency)| {
            now += secs(delay as u64);
            series.add(now, ms(latency as u64));

            let retained: Vec<_> = series.samples().collect();
            let in_window = retained.iter().all(|s| now - s.timestamp <= window);
            let expected_average = if retained.is_empty() {
                None
            } else {
                let sum: u128 = retained.iter().map(|s| s.latency.as_nanos()).sum();
                Some(Duration::from_nanos((sum / retained.len() as u128) as u64))
            };
            in_window && !retained.is_empty() && series.average_latency() == expected_average
        })
    }
}
