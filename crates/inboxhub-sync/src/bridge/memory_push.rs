//! In-process push channel for single-process deployments and tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use inboxhub_core::error::AppError;
use inboxhub_core::result::AppResult;
use inboxhub_entity::{ChannelState, NotificationRecord};
use inboxhub_service::{PushChannel, PushEvent, PushHandler};

/// In-memory [`PushChannel`].
///
/// Delivery is synchronous: [`publish`](Self::publish) invokes the subscribed
/// handler on the caller's thread while the channel is connected.
pub struct MemoryPushChannel {
    state: Mutex<ChannelState>,
    handler: Mutex<Option<PushHandler>>,
    refuse_connect: AtomicBool,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: AtomicUsize,
}

impl std::fmt::Debug for MemoryPushChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPushChannel")
            .field("state", &*lock(&self.state))
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

impl MemoryPushChannel {
    /// Create a disconnected channel.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState::Disconnected),
            handler: Mutex::new(None),
            refuse_connect: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            subscribe_calls: AtomicUsize::new(0),
            unsubscribe_calls: AtomicUsize::new(0),
        }
    }

    /// Override the raw state, as a transport would on its own.
    pub fn set_state(&self, state: ChannelState) {
        *lock(&self.state) = state;
    }

    /// Make subsequent `connect` calls fail.
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse_connect.store(refuse, Ordering::SeqCst);
    }

    /// Deliver a notification. Returns `false` when it could not be delivered
    /// because the channel is not connected or nobody is subscribed.
    pub fn publish(&self, record: NotificationRecord) -> bool {
        if *lock(&self.state) != ChannelState::Connected {
            debug!(notification_id = %record.id, "Push channel not connected, dropping");
            return false;
        }
        self.deliver(PushEvent::Notification(record))
    }

    /// Simulate a hard transport failure: the link drops and the subscriber
    /// receives [`PushEvent::Error`].
    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.set_state(ChannelState::Disconnected);
        self.deliver(PushEvent::Error(message.into()))
    }

    /// Whether a handler is registered.
    pub fn is_subscribed(&self) -> bool {
        lock(&self.handler).is_some()
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls.load(Ordering::SeqCst)
    }

    fn deliver(&self, event: PushEvent) -> bool {
        // Clone out so the handler runs without our lock held.
        let handler = lock(&self.handler).clone();
        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryPushChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushChannel for MemoryPushChannel {
    async fn connect(&self) -> AppResult<()> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connect.load(Ordering::SeqCst) {
            self.set_state(ChannelState::Disconnected);
            return Err(AppError::transport("push channel refused the connection"));
        }

        let mut state = lock(&self.state);
        if matches!(*state, ChannelState::Connected | ChannelState::Connecting) {
            return Ok(());
        }
        *state = ChannelState::Connected;
        Ok(())
    }

    async fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.state) = ChannelState::Disconnected;
    }

    fn subscribe(&self, handler: PushHandler) -> AppResult<()> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.handler) = Some(handler);
        Ok(())
    }

    fn unsubscribe(&self) {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.handler).take();
    }

    fn state(&self) -> ChannelState {
        *lock(&self.state)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
