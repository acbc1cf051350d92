use std::{sync::Arc, time::Duration};

use log::{info, trace};
use tokio::{
    select,
    sync::{oneshot, watch},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_stream::wrappers::WatchStream;

use crate::{clock::Clock, peer::PeerKey, tracker::Tracker};

/// Periodically ranks the peers of a [Tracker] and publishes the `n` best ones.
///
/// The ranking task runs on the current tokio runtime. A new ranking is only published when it
/// differs from the previous one, so subscribers are woken up when the best peers change.
pub struct RankingPublisher {
    rankings: watch::Receiver<Vec<PeerKey>>,
    shutdown_sender: Option<oneshot::Sender<()>>,
    ranking_task: JoinHandle<()>,
}

impl RankingPublisher {
    pub fn spawn<C: Clock>(tracker: Arc<Tracker<C>>, every: Duration, n: usize) -> Self {
        let (rankings_sender, rankings) = watch::channel(tracker.top_n(n));
        let (shutdown_sender, shutdown_receiver) = oneshot::channel();
        let ranking_task = tokio::spawn(Self::ranking_task(
            tracker,
            every,
            n,
            rankings_sender,
            shutdown_receiver,
        ));
        Self {
            rankings,
            shutdown_sender: Some(shutdown_sender),
            ranking_task,
        }
    }

    async fn ranking_task<C: Clock>(
        tracker: Arc<Tracker<C>>,
        every: Duration,
        n: usize,
        rankings_sender: watch::Sender<Vec<PeerKey>>,
        mut shutdown_receiver: oneshot::Receiver<()>,
    ) {
        info!("Publishing the top {} peers every {:?}", n, every);
        let mut ticks = interval(every);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            select! {
                _ = &mut shutdown_receiver => break,
                _ = ticks.tick() => {
                    let top = tracker.top_n(n);
                    rankings_sender.send_if_modified(|published| {
                        if *published == top {
                            false
                        } else {
                            trace!("Top peers changed to {:?}", top);
                            *published = top;
                            true
                        }
                    });
                }
            }
        }
        info!("Stopped publishing peer rankings");
    }

    /// The last published ranking
    pub fn latest(&self) -> Vec<PeerKey> {
        self.rankings.borrow().clone()
    }

    /// A stream yielding the current ranking, then every new one.
    pub fn subscribe(&self) -> WatchStream<Vec<PeerKey>> {
        WatchStream::new(self.rankings.clone())
    }

    pub fn receiver(&self) -> watch::Receiver<Vec<PeerKey>> {
        self.rankings.clone()
    }

    /// Stops the ranking task and waits for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(shutdown_sender) = self.shutdown_sender.take() {
            let _ = shutdown_sender.send(());
        }
        let _ = (&mut self.ranking_task).await;
    }
}

impl Drop for RankingPublisher {
    fn drop(&mut self) {
        self.ranking_task.abort();
    }
}
