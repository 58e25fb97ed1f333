//! Push channel trait.

use std::sync::Arc;

use async_trait::async_trait;

use inboxhub_core::result::AppResult;
use inboxhub_entity::{ChannelState, NotificationRecord};

/// Something the push channel delivers to its subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// A newly created notification.
    Notification(NotificationRecord),
    /// The transport hit a hard failure.
    Error(String),
}

/// Callback invoked for every delivered [`PushEvent`].
pub type PushHandler = Arc<dyn Fn(PushEvent) + Send + Sync>;

/// Managed socket client delivering server-initiated notifications.
///
/// `connect` and `disconnect` must be idempotent. At most one handler is
/// subscribed at a time; subscribing again replaces it.
#[async_trait]
pub trait PushChannel: Send + Sync + std::fmt::Debug + 'static {
    /// Open the connection. No-op when already connected or connecting.
    async fn connect(&self) -> AppResult<()>;

    /// Close the connection. No-op when already closed.
    async fn disconnect(&self);

    /// Register the handler receiving every delivered event.
    fn subscribe(&self, handler: PushHandler) -> AppResult<()>;

    /// Drop the current handler, if any.
    fn unsubscribe(&self);

    /// Current raw state of the underlying client.
    fn state(&self) -> ChannelState;
}
