//! Periodic TTL sweep task with graceful shutdown.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::store::SessionStore;

/// Handle owning the background sweep task.
///
/// Shutting down the handle signals the loop and waits for it to exit,
/// releasing its scheduling resource. Dropping the handle without calling
/// [`shutdown`](Self::shutdown) also stops the loop: the closed channel is
/// treated as a shutdown signal at the next wakeup.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweep loop to stop and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

impl SessionStore {
    /// Spawns the periodic TTL sweep for this store.
    ///
    /// The loop wakes every `sweep_interval`, removes sessions idle longer
    /// than the TTL, and exits promptly once the returned handle is shut
    /// down. The sweep is the only TTL mechanism; capacity eviction happens
    /// synchronously inside `create`.
    #[must_use]
    pub fn start_sweeper(self: &Arc<Self>) -> SweeperHandle {
        let (shutdown, mut signal) = watch::channel(false);
        let store = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(store.config().sweep_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so a sweep never
            // races session creation at startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = store.sweep_expired().await;
                        if removed > 0 {
                            info!(removed, "session sweep removed expired sessions");
                        } else {
                            debug!("session sweep found nothing to expire");
                        }
                    }
                    changed = signal.changed() => {
                        if changed.is_err() || *signal.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("session sweeper stopped");
        });

        SweeperHandle { shutdown, task }
    }
}
