//! Top-level engine wiring the store, fetch coordinator and lifecycle together.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::info;

use inboxhub_core::config::AppConfig;
use inboxhub_core::types::NotificationId;
use inboxhub_service::{PushChannel, RemoteNotificationService};

use crate::fetch::{FetchCoordinator, FetchOutcome};
use crate::lifecycle::LifecycleController;
use crate::store::{NotificationStore, StoreEvent, StoreSnapshot};

/// The surface exposed to the UI layer.
#[derive(Clone)]
pub struct InboxEngine {
    /// Notification store.
    pub store: Arc<NotificationStore>,
    /// Fetch coordinator.
    pub fetcher: FetchCoordinator,
    /// Session lifecycle.
    pub lifecycle: Arc<LifecycleController>,
}

impl std::fmt::Debug for InboxEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboxEngine").finish()
    }
}

impl InboxEngine {
    /// Build an idle engine. No session runs until the lifecycle is told the
    /// user is authenticated.
    pub fn new(
        config: &AppConfig,
        remote: Arc<dyn RemoteNotificationService>,
        channel: Arc<dyn PushChannel>,
    ) -> Self {
        let store = Arc::new(NotificationStore::new(
            remote,
            &config.store,
            config.realtime.event_buffer_size,
        ));
        let fetcher = FetchCoordinator::new(store.clone(), config.store.page_size);
        let lifecycle = Arc::new(LifecycleController::new(
            fetcher.clone(),
            channel,
            config.realtime.poll_interval(),
        ));

        info!(
            page_size = config.store.page_size,
            poll_interval_ms = config.realtime.poll_interval_ms,
            "Inbox engine initialized"
        );

        Self {
            store,
            fetcher,
            lifecycle,
        }
    }

    /// Receive every store change.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    /// Owned copy of the store state.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    pub async fn load_initial(&self) -> FetchOutcome {
        self.fetcher.load_initial().await
    }

    pub async fn refresh(&self) -> FetchOutcome {
        self.fetcher.refresh().await
    }

    pub async fn load_more(&self) -> FetchOutcome {
        self.fetcher.load_more().await
    }

    pub async fn mark_one_read(&self, id: &NotificationId) -> bool {
        self.store.mark_one_read(id).await
    }

    pub async fn mark_all_read(&self) -> bool {
        self.store.mark_all_read().await
    }

    /// Drive the lifecycle from `auth` on a background task.
    pub fn spawn_follow(&self, auth: watch::Receiver<bool>) -> JoinHandle<()> {
        let lifecycle = self.lifecycle.clone();
        tokio::spawn(async move { lifecycle.follow(auth).await })
    }

    /// End the active session.
    pub async fn shutdown(&self) {
        info!("Shutting down inbox engine");
        self.lifecycle.shutdown().await;
        info!("Inbox engine shut down");
    }
}
