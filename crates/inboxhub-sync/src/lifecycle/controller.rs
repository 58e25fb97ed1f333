//! Starts and tears down the push subscription and connection poll.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

use inboxhub_core::types::SessionId;
use inboxhub_entity::ConnectionState;
use inboxhub_service::{PushChannel, PushEvent, PushHandler};

use crate::connection::ConnectionStateTracker;
use crate::fetch::FetchCoordinator;
use crate::store::NotificationStore;

/// Resources owned by one authenticated session.
#[derive(Debug)]
struct ActiveSession {
    id: SessionId,
    shutdown_tx: watch::Sender<bool>,
    poll_task: Option<JoinHandle<()>>,
    initial_load: AbortHandle,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.initial_load.abort();
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }
}

/// Reacts to authentication transitions.
///
/// On login: connection state `Connecting`, poll started, channel connected
/// and subscribed, first page loaded. On logout: unsubscribe, disconnect,
/// stop the poll, clear the store. Repeated signals with the same value are
/// no-ops.
#[derive(Debug)]
pub struct LifecycleController {
    store: Arc<NotificationStore>,
    fetcher: FetchCoordinator,
    channel: Arc<dyn PushChannel>,
    poll_interval: Duration,
    session: Mutex<Option<ActiveSession>>,
}

impl LifecycleController {
    /// Create an idle controller.
    pub fn new(
        fetcher: FetchCoordinator,
        channel: Arc<dyn PushChannel>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store: fetcher.store().clone(),
            fetcher,
            channel,
            poll_interval,
            session: Mutex::new(None),
        }
    }

    /// Apply the current authentication state. Returns whether a session was
    /// started or stopped.
    ///
    /// A login returns once the first page has been loaded.
    pub async fn set_authenticated(&self, authenticated: bool) -> bool {
        if !authenticated {
            return self.stop().await;
        }
        match self.start().await {
            Some(initial_load) => {
                let _ = initial_load.await;
                true
            }
            None => false,
        }
    }

    /// Follow `auth` until its sender is dropped, then tear down.
    ///
    /// The first page loads in the background, so a logout arriving while it
    /// is still in flight ends the session right away.
    pub async fn follow(&self, mut auth: watch::Receiver<bool>) {
        loop {
            let authenticated = *auth.borrow_and_update();
            if authenticated {
                self.start().await;
            } else {
                self.stop().await;
            }

            if auth.changed().await.is_err() {
                break;
            }
        }

        debug!("Authentication signal closed");
        self.shutdown().await;
    }

    /// Tear down the active session, if any.
    pub async fn shutdown(&self) {
        self.stop().await;
    }

    /// Whether a session is running.
    pub async fn is_active(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Id of the running session.
    pub async fn session_id(&self) -> Option<SessionId> {
        self.session.lock().await.as_ref().map(|s| s.id)
    }

    /// Open a session and spawn its first page load. `None` when a session
    /// is already running.
    async fn start(&self) -> Option<JoinHandle<()>> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            debug!("Notification session already active");
            return None;
        }

        let id = SessionId::new();
        let epoch = self.store.epoch();
        info!(session_id = %id, epoch, "Starting notification session");

        self.store.set_connection_state(ConnectionState::Connecting);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let poll_task = ConnectionStateTracker::new(
            self.channel.clone(),
            self.store.clone(),
            self.poll_interval,
        )
        .spawn(shutdown_rx);

        if let Err(err) = self.channel.connect().await {
            self.store.report_channel_error(&err.message);
        }
        if let Err(err) = self.channel.subscribe(self.push_handler(epoch)) {
            self.store.report_channel_error(&err.message);
        }

        let fetcher = self.fetcher.clone();
        let initial_load = tokio::spawn(async move {
            fetcher.load_initial().await;
        });

        *session = Some(ActiveSession {
            id,
            shutdown_tx,
            poll_task: Some(poll_task),
            initial_load: initial_load.abort_handle(),
        });
        Some(initial_load)
    }

    async fn stop(&self) -> bool {
        let mut guard = self.session.lock().await;
        let Some(mut session) = guard.take() else {
            debug!("No notification session to stop");
            return false;
        };

        self.channel.unsubscribe();
        self.channel.disconnect().await;

        session.initial_load.abort();
        let _ = session.shutdown_tx.send(true);
        if let Some(task) = session.poll_task.take() {
            let _ = task.await;
        }

        self.store.reset();
        info!(session_id = %session.id, "Notification session ended");
        true
    }

    /// Route channel deliveries into the store for the session started at `epoch`.
    fn push_handler(&self, epoch: u64) -> PushHandler {
        let store = self.store.clone();
        Arc::new(move |event: PushEvent| match event {
            PushEvent::Notification(record) => {
                store.insert_pushed_if_current(epoch, record);
            }
            PushEvent::Error(cause) => store.report_channel_error_if_current(epoch, &cause),
        })
    }
}
