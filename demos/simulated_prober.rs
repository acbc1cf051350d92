//! Feeds simulated echo replies from a few peers with different latency and loss profiles into a
//! tracker, and prints the best peers whenever the ranking changes.
//!
//! Run with `cargo run --example simulated-prober`.

use std::{
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
    time::Duration,
};

use log::{info, LevelFilter};
use rand::Rng;
use rttrank::{RankingPublisher, RttPinger, Tracker};
use simplelog::{ConfigBuilder, SimpleLogger};
use tokio_stream::StreamExt;

struct SimulatedPeer {
    addr: IpAddr,
    base_latency: Duration,
    jitter_ms: u64,
    loss_rate: f64,
}

impl SimulatedPeer {
    fn new(last_octet: u8, base_latency_ms: u64, jitter_ms: u64, loss_rate: f64) -> Self {
        Self {
            addr: IpAddr::V4(Ipv4Addr::new(192, 0, 2, last_octet)),
            base_latency: Duration::from_millis(base_latency_ms),
            jitter_ms,
            loss_rate,
        }
    }

    /// One probe round: [None] when the request or its reply got lost
    fn probe(&self, rng: &mut impl Rng) -> Option<Duration> {
        if rng.gen_bool(self.loss_rate) {
            return None;
        }
        Some(self.base_latency + Duration::from_millis(rng.gen_range(0..=self.jitter_ms)))
    }
}

#[tokio::main]
pub async fn main() {
    let _ = SimpleLogger::init(LevelFilter::Debug, ConfigBuilder::new().build());

    let tracker = Arc::new(
        Tracker::builder()
            .with_retention_window(Duration::from_secs(10))
            .build()
            .expect("valid tracker configuration"),
    );
    let pinger = RttPinger::new(Arc::clone(&tracker), Duration::from_millis(250));
    let on_reply = pinger.reply_handler();

    let peers = vec![
        SimulatedPeer::new(1, 20, 5, 0.0),
        SimulatedPeer::new(2, 8, 2, 0.6),
        SimulatedPeer::new(3, 60, 40, 0.05),
        SimulatedPeer::new(4, 180, 120, 0.2),
    ];

    tokio::spawn(async move {
        let mut rounds = tokio::time::interval(Duration::from_millis(200));
        loop {
            rounds.tick().await;
            let mut rng = rand::thread_rng();
            for peer in &peers {
                if let Some(rtt) = peer.probe(&mut rng) {
                    on_reply(peer.addr, rtt);
                }
            }
        }
    });

    let publisher = RankingPublisher::spawn(Arc::clone(&tracker), Duration::from_secs(1), 3);
    let mut rankings = publisher.subscribe().take(10);
    while let Some(top) = rankings.next().await {
        info!("Best peers: {:?}", top);
        for summary in tracker.ranking() {
            info!(
                "  {} answered {} probes, average {:?}",
                summary.peer, summary.sample_count, summary.average_latency
            );
        }
    }
    publisher.shutdown().await;
}
