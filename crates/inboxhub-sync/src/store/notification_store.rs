//! The shared notification store.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use inboxhub_core::config::StoreConfig;
use inboxhub_core::error::AppError;
use inboxhub_core::result::AppResult;
use inboxhub_core::types::{NotificationId, Page, PageMeta};
use inboxhub_entity::{ConnectionState, NotificationRecord};
use inboxhub_service::RemoteNotificationService;

use super::events::{StoreEvent, StoreSnapshot};
use super::state::{FetchMode, FetchTicket, StoreState};
use crate::fetch::FetchOutcome;

/// Single owner of the notification list.
///
/// All mutation goes through the operations below. The state lock is only
/// ever held for the synchronous part of an operation, never across a
/// remote call, so pushes, polls and taps interleave freely with in-flight
/// round-trips. Changes are published on a broadcast channel.
#[derive(Debug)]
pub struct NotificationStore {
    remote: Arc<dyn RemoteNotificationService>,
    state: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl NotificationStore {
    /// Create an empty store.
    pub fn new(
        remote: Arc<dyn RemoteNotificationService>,
        config: &StoreConfig,
        event_buffer: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            remote,
            state: Mutex::new(StoreState::new(config.dedupe_pushed)),
            events,
        }
    }

    /// Receive every subsequent change.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Remote service backing the round-trip operations.
    pub fn remote(&self) -> &Arc<dyn RemoteNotificationService> {
        &self.remote
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().snapshot()
    }

    pub fn records(&self) -> Vec<NotificationRecord> {
        self.lock().records().to_vec()
    }

    pub fn unread_count(&self) -> u64 {
        self.lock().unread_count()
    }

    pub fn meta(&self) -> PageMeta {
        self.lock().meta()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.lock().connection()
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().error_message()
    }

    /// Error slot contents with their kind.
    pub fn error(&self) -> Option<AppError> {
        self.lock().error().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn is_marking_all(&self) -> bool {
        self.lock().is_marking_all()
    }

    /// Current session epoch. Changes on every [`reset`](Self::reset).
    pub fn epoch(&self) -> u64 {
        self.lock().epoch()
    }

    /// Overwrite the list and pagination metadata (page 1 or refresh).
    pub fn replace_page(&self, records: Vec<NotificationRecord>, meta: PageMeta) {
        self.mutate(|state| state.replace_page(records, meta));
    }

    /// Append a further page at the tail.
    pub fn append_page(&self, records: Vec<NotificationRecord>, meta: PageMeta) {
        self.mutate(|state| state.append_page(records, meta));
    }

    /// Insert a pushed record at the head. Returns whether it was inserted.
    pub fn insert_pushed(&self, record: NotificationRecord) -> bool {
        let id = record.id.clone();
        let inserted = self.mutate(|state| state.insert_pushed(record));
        if !inserted {
            debug!(notification_id = %id, "Dropped duplicate pushed notification");
        }
        inserted
    }

    /// Insert a pushed record only if the session that received it is still current.
    pub fn insert_pushed_if_current(&self, epoch: u64, record: NotificationRecord) -> bool {
        self.mutate(|state| state.is_current(epoch) && state.insert_pushed(record))
    }

    /// Optimistically mark one notification as read.
    ///
    /// Returns `false` only when the remote rejected the change and it was
    /// rolled back. Already-read and unknown ids succeed without a remote call.
    pub async fn mark_one_read(&self, id: &NotificationId) -> bool {
        let Some(token) = self.mutate(|state| state.begin_mark_one(id)) else {
            debug!(notification_id = %id, "Notification already read or unknown");
            return true;
        };

        match self.remote.mark_one_read(id).await {
            Ok(()) => {
                self.mutate(|state| state.confirm_mark_one(&token));
                true
            }
            Err(err) => {
                let reverted = self.mutate(|state| state.rollback_mark_one(&token, &err));
                warn!(notification_id = %id, reverted, error = %err, "Mark as read rejected");
                false
            }
        }
    }

    /// Optimistically mark every notification as read.
    ///
    /// Returns `false` when another mark-all is still outstanding (no remote
    /// call is made) or when the remote rejected the change.
    pub async fn mark_all_read(&self) -> bool {
        let Some(token) = self.mutate(|state| state.begin_mark_all()) else {
            debug!("Mark all already in progress");
            return false;
        };

        match self.remote.mark_all_read().await {
            Ok(()) => {
                self.mutate(|state| state.confirm_mark_all(&token));
                info!("Marked all notifications as read");
                true
            }
            Err(err) => {
                let reverted = self.mutate(|state| state.rollback_mark_all(token, &err));
                warn!(reverted, error = %err, "Mark all as read rejected");
                false
            }
        }
    }

    /// Write the connection state. Returns `false` for a no-op write.
    pub fn set_connection_state(&self, state: ConnectionState) -> bool {
        self.mutate(|s| s.set_connection_state(state))
    }

    /// Record a hard push channel failure.
    pub fn report_channel_error(&self, cause: &str) {
        warn!(cause, "Notification channel error");
        self.mutate(|state| state.report_channel_error(cause));
    }

    /// Record a push channel failure only if the reporting session is still current.
    pub fn report_channel_error_if_current(&self, epoch: u64, cause: &str) {
        let applied = self.mutate(|state| {
            let current = state.is_current(epoch);
            if current {
                state.report_channel_error(cause);
            }
            current
        });
        if applied {
            warn!(cause, "Notification channel error");
        }
    }

    /// Clear the error slot.
    pub fn acknowledge_error(&self) -> bool {
        self.mutate(|state| state.acknowledge_error())
    }

    /// Empty the store and start a new epoch.
    pub fn reset(&self) {
        self.mutate(|state| state.reset());
    }

    pub(crate) fn begin_fetch(
        &self,
        mode: FetchMode,
        page_size: u64,
    ) -> Result<FetchTicket, FetchOutcome> {
        self.mutate(|state| state.begin_fetch(mode, page_size))
    }

    pub(crate) fn finish_fetch(
        &self,
        ticket: FetchTicket,
        result: AppResult<Page<NotificationRecord>>,
    ) -> FetchOutcome {
        self.mutate(|state| state.finish_fetch(ticket, result))
    }

    /// Run `f` under the lock, then publish whatever it changed.
    fn mutate<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let (result, events) = {
            let mut state = self.lock();
            let result = f(&mut *state);
            (result, state.take_events())
        };
        for event in events {
            let _ = self.events.send(event);
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
