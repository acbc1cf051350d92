use std::{net::IpAddr, sync::Arc, time::Duration};

use log::debug;

use crate::{
    clock::{Clock, MonotonicClock},
    tracker::Tracker,
};

/// Connects an ICMP prober to a [Tracker].
///
/// The prober itself lives outside of this crate: it sends echo requests, and hands every reply it
/// receives to [RttPinger::on_recv], or to the closure returned by [RttPinger::reply_handler].
/// Replies slower than `max_rtt` are ignored, the prober having already given up on them.
pub struct RttPinger<C: Clock = MonotonicClock> {
    tracker: Arc<Tracker<C>>,
    max_rtt: Duration,
}

impl<C: Clock> RttPinger<C> {
    pub fn new(tracker: Arc<Tracker<C>>, max_rtt: Duration) -> Self {
        Self { tracker, max_rtt }
    }

    pub fn max_rtt(&self) -> Duration {
        self.max_rtt
    }

    pub fn tracker(&self) -> &Arc<Tracker<C>> {
        &self.tracker
    }

    /// Records a reply from `addr`. Returns false when the reply came later than `max_rtt` and was dropped.
    pub fn on_recv(&self, addr: IpAddr, rtt: Duration) -> bool {
        record_reply(&self.tracker, self.max_rtt, addr, rtt)
    }

    /// A reply callback that can be moved into the prober's receive loop.
    pub fn reply_handler(&self) -> impl Fn(IpAddr, Duration) + Send + Sync + 'static {
        let tracker = Arc::clone(&self.tracker);
        let max_rtt = self.max_rtt;
        move |addr, rtt| {
            record_reply(&tracker, max_rtt, addr, rtt);
        }
    }
}

fn record_reply<C: Clock>(
    tracker: &Tracker<C>,
    max_rtt: Duration,
    addr: IpAddr,
    rtt: Duration,
) -> bool {
    if rtt > max_rtt {
        debug!(
            "Dropping reply from {} after {:?}, exceeding the {:?} maximum",
            addr, rtt, max_rtt
        );
        return false;
    }
    tracker.record(addr, rtt);
    true
}

#[cfg(test)]
mod tests {
    use std::{
        net::{IpAddr, Ipv4Addr, Ipv6Addr},
        sync::Arc,
        thread,
        time::Duration,
    };

    use super::RttPinger;
    use crate::Tracker;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn replies_are_recorded_under_their_address() {
        let pinger = RttPinger::new(Arc::new(Tracker::new()), Duration::from_secs(1));
        assert!(pinger.on_recv(LOCALHOST, Duration::from_millis(3)));
        assert!(pinger.on_recv(IpAddr::V6(Ipv6Addr::LOCALHOST), Duration::from_millis(4)));

        let tracker = pinger.tracker();
        assert_eq!(tracker.len(), 2);
        assert_eq!(
            tracker.average_latency("127.0.0.1"),
            Ok(Duration::from_millis(3))
        );
        assert!(tracker.contains("::1"));
    }

    #[test]
    fn replies_slower_than_max_rtt_are_dropped() {
        let pinger = RttPinger::new(Arc::new(Tracker::new()), Duration::from_millis(100));
        assert!(!pinger.on_recv(LOCALHOST, Duration::from_millis(101)));
        assert!(pinger.tracker().is_empty());

        assert!(pinger.on_recv(LOCALHOST, Duration::from_millis(100)));
        assert_eq!(pinger.tracker().len(), 1);
    }

    #[test]
    fn reply_handler_can_be_called_from_many_threads() {
        let pinger = RttPinger::new(Arc::new(Tracker::new()), Duration::from_secs(1));
        let handler = Arc::new(pinger.reply_handler());

        let threads: Vec<_> = (0..4u8)
            .map(|i| {
                let handler = Arc::clone(&handler);
                thread::spawn(move || {
                    for _ in 0..25 {
                        handler(
                            IpAddr::V4(Ipv4Addr::new(10, 0, 0, i)),
                            Duration::from_millis(i as u64 + 1),
                        );
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let ranking = pinger.tracker().ranking();
        assert_eq!(ranking.len(), 4);
        assert!(ranking.iter().all(|summary| summary.sample_count == 25));
        assert_eq!(ranking[0].peer, "10.0.0.0");
    }
}
