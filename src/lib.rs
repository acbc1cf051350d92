//! Sliding-window round-trip-time tracking and reliability ranking of network peers.
//!
//! A prober reports every reply it receives to a [Tracker], which keeps the samples of each peer
//! that fall within a retention window. [Tracker::top_n] then ranks peers by how many replies they
//! answered within the window and how fast, letting a significant advantage on one axis outweigh
//! a small disadvantage on the other.
//!
//! ```
//! use std::time::Duration;
//! use rttrank::Tracker;
//!
//! let tracker = Tracker::builder()
//!     .with_retention_window(Duration::from_secs(60))
//!     .build()
//!     .unwrap();
//! tracker.record("10.0.0.1", Duration::from_millis(12));
//! tracker.record("10.0.0.2", Duration::from_millis(40));
//! assert_eq!(tracker.top_n(1)[0], "10.0.0.1");
//! ```

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod builder;
mod error;

pub mod clock;
pub mod config;
pub mod peer;
pub mod pinger;
pub mod publisher;
pub mod tracker;

pub use self::{
    builder::*,
    clock::{Clock, ManualClock, MonotonicClock},
    config::TrackerConfig,
    error::{Error, Result},
    peer::PeerKey,
    pinger::RttPinger,
    publisher::RankingPublisher,
    tracker::{PeerSummary, Tracker},
};
