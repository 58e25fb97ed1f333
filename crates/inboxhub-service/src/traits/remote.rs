//! Remote notification service trait.

use async_trait::async_trait;

use inboxhub_core::result::AppResult;
use inboxhub_core::types::{NotificationId, Page, PageRequest};
use inboxhub_entity::NotificationRecord;

/// Request/response access to the authoritative notification list.
///
/// Each call is one round-trip and a suspension point for the caller.
#[async_trait]
pub trait RemoteNotificationService: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch one page, newest first.
    async fn fetch_page(&self, request: PageRequest) -> AppResult<Page<NotificationRecord>>;

    /// Mark a single notification as read. Idempotent on the server.
    async fn mark_one_read(&self, id: &NotificationId) -> AppResult<()>;

    /// Mark every notification of the user as read.
    async fn mark_all_read(&self) -> AppResult<()>;
}
