//! Polls the push channel's raw state into the store's connection state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use inboxhub_entity::ConnectionState;
use inboxhub_service::PushChannel;

use crate::store::NotificationStore;

/// Maps [`PushChannel::state`] onto the store at a fixed interval.
///
/// Writes that would not change the stored state are filtered out by the
/// store, so a steady channel produces no events.
#[derive(Debug, Clone)]
pub struct ConnectionStateTracker {
    channel: Arc<dyn PushChannel>,
    store: Arc<NotificationStore>,
    interval: Duration,
}

impl ConnectionStateTracker {
    /// Create a tracker polling every `interval`.
    pub fn new(
        channel: Arc<dyn PushChannel>,
        store: Arc<NotificationStore>,
        interval: Duration,
    ) -> Self {
        Self {
            channel,
            store,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Read the raw state once and write it. Returns whether the stored state changed.
    pub fn poll_once(&self) -> bool {
        let raw = self.channel.state();
        let mapped = ConnectionState::from(raw);
        let changed = self.store.set_connection_state(mapped);
        if changed {
            debug!(?raw, state = %mapped, "Connection state changed");
        }
        changed
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// The first poll happens one interval after the start.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.poll_once();
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Connection poll stopped");
        })
    }
}
