use std::{collections::HashMap, time::Duration};

use log::{debug, trace};
use parking_lot::Mutex;

use self::{ranking::rank, series::Series};
use crate::{
    builder::TrackerBuilder,
    clock::{Clock, MonotonicClock},
    config::TrackerConfig,
    error::{Error, Result},
    peer::PeerKey,
};

pub mod ranking;
pub mod series;


/// The statistics of one peer over the retention window, as used for ranking.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PeerSummary {
    pub peer: PeerKey,
    /// Replies received within the retention window
    pub sample_count: usize,
    #[cfg_attr(
        feature = "serde",
        serde(with = "serde_with::As::<Option<serde_with::DurationMilliSecondsWithFrac<f64>>>")
    )]
    pub average_latency: Option<Duration>,
    #[cfg_attr(
        feature = "serde",
        serde(with = "serde_with::As::<Option<serde_with::DurationMilliSecondsWithFrac<f64>>>")
    )]
    pub min_latency: Option<Duration>,
    #[cfg_attr(
        feature = "serde",
        serde(with = "serde_with::As::<Option<serde_with::DurationMilliSecondsWithFrac<f64>>>")
    )]
    pub max_latency: Option<Duration>,
}

/// The [Tracker] records the round-trip times measured for each probed peer and ranks peers
/// from most to least reliably responsive.
///
/// Each peer gets a [Series] the first time it is [recorded](Tracker::record). Series only keep the
/// samples taken within the configured retention window, so a peer that stops answering gradually
/// loses samples and falls down the [ranking](Tracker::top_n), but it is never forgotten.
///
/// A single lock guards every series and the ranking order: recording and querying never interleave,
/// and a query never observes a series in the middle of an update. Share a tracker with [Arc](std::sync::Arc).
pub struct Tracker<C: Clock = MonotonicClock> {
    config: TrackerConfig,
    clock: C,
    registry: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    series: HashMap<PeerKey, Series>,
    // every known peer, in the order of the last ranking
    order: Vec<PeerKey>,
}

impl Tracker {
    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::new()
    }

    /// A tracker using the default configuration and the system's monotonic clock
    pub fn new() -> Self {
        Self::with_clock(TrackerConfig::default(), MonotonicClock)
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Tracker<C> {
    /// Builds a tracker from a configuration that has already been [validated](TrackerConfig::validate).
    pub(crate) fn with_clock(config: TrackerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Records a round-trip time measured for `peer`, registering the peer if it was never seen.
    pub fn record(&self, peer: impl Into<PeerKey>, latency: Duration) {
        let peer = peer.into();
        let mut registry = self.registry.lock();
        let now = self.clock.now();
        let Registry { series, order } = &mut *registry;

        series
            .entry(peer)
            .or_insert_with_key(|peer| {
                debug!("Tracking round-trip times of new peer {}", peer);
                order.push(peer.clone());
                Series::new(peer.clone(), self.config.retention_window)
            })
            .add(now, latency);
    }

    /// Returns the keys of the `n` best ranked peers, best first.
    ///
    /// Fewer keys are returned when fewer peers are known, and none when `n` is zero. The ranking is
    /// recomputed on every call: samples leaving the retention window can reorder peers even when
    /// nothing was recorded in between.
    pub fn top_n(&self, n: usize) -> Vec<PeerKey> {
        if n == 0 {
            return Vec::new();
        }
        self.ranked_summaries()
            .into_iter()
            .take(n)
            .map(|summary| summary.peer)
            .collect()
    }

    /// Summaries of every known peer, best first.
    pub fn ranking(&self) -> Vec<PeerSummary> {
        self.ranked_summaries()
    }

    fn ranked_summaries(&self) -> Vec<PeerSummary> {
        let mut registry = self.registry.lock();
        let now = self.clock.now();
        let Registry { series, order } = &mut *registry;

        let mut summaries: Vec<PeerSummary> = order
            .iter()
            .filter_map(|peer| {
                let series = series.get_mut(peer)?;
                series.evict_expired(now);
                Some(series.summary())
            })
            .collect();
        rank(&mut summaries, &self.config.tolerances());
        trace!("Ranked {} peers", summaries.len());

        order.clear();
        order.extend(summaries.iter().map(|summary| summary.peer.clone()));
        summaries
    }

    /// The current statistics of a single peer, or [None] if it was never recorded.
    pub fn summary(&self, peer: &str) -> Option<PeerSummary> {
        let mut registry = self.registry.lock();
        let now = self.clock.now();
        registry.series.get_mut(peer).map(|series| {
            series.evict_expired(now);
            series.summary()
        })
    }

    /// The average round-trip time of `peer` over the retention window.
    pub fn average_latency(&self, peer: &str) -> Result<Duration> {
        let summary = self
            .summary(peer)
            .ok_or_else(|| Error::UnknownPeer(PeerKey::from(peer)))?;
        summary
            .average_latency
            .ok_or(Error::EmptySeries(summary.peer))
    }

    pub fn contains(&self, peer: &str) -> bool {
        self.registry.lock().series.contains_key(peer)
    }

    /// Every known peer, in the order of the last ranking, then registration order.
    pub fn peers(&self) -> Vec<PeerKey> {
        self.registry.lock().order.clone()
    }

    pub fn len(&self) -> usize {
        self.registry.lock().series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
