//! Drives paged fetches into the store behind a single in-flight guard.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::store::{FetchMode, NotificationStore};

/// Result of one fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was fetched and applied.
    Applied {
        /// Page number requested.
        page: u64,
        /// Records received.
        count: usize,
    },
    /// Another fetch was in flight; this request was dropped, not queued.
    InFlight,
    /// There is no page after the current one.
    NoMorePages,
    /// The remote call failed; the list is untouched and the error slot is set.
    Failed,
    /// The store was reset while the call was in flight; the result was discarded.
    Stale,
}

impl FetchOutcome {
    /// Whether the store now reflects a new page.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Serializes remote fetches for one store.
///
/// Concurrent requests collapse: while a fetch is in flight every other
/// request returns [`FetchOutcome::InFlight`] without reaching the remote.
#[derive(Debug, Clone)]
pub struct FetchCoordinator {
    store: Arc<NotificationStore>,
    page_size: u64,
}

impl FetchCoordinator {
    /// Create a coordinator fetching `page_size` records per page.
    pub fn new(store: Arc<NotificationStore>, page_size: u64) -> Self {
        Self { store, page_size }
    }

    /// The store this coordinator feeds.
    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    /// Fetch page 1 and replace the list.
    pub async fn load_initial(&self) -> FetchOutcome {
        self.run(FetchMode::Replace).await
    }

    /// Same as [`load_initial`](Self::load_initial), callable at any time.
    pub async fn refresh(&self) -> FetchOutcome {
        debug!("Refreshing notifications");
        self.run(FetchMode::Replace).await
    }

    /// Fetch the page after the current one and append it.
    pub async fn load_more(&self) -> FetchOutcome {
        self.run(FetchMode::Append).await
    }

    async fn run(&self, mode: FetchMode) -> FetchOutcome {
        let ticket = match self.store.begin_fetch(mode, self.page_size) {
            Ok(ticket) => ticket,
            Err(outcome) => {
                debug!(?mode, ?outcome, "Fetch skipped");
                return outcome;
            }
        };

        let request = ticket.request();
        let result = self.store.remote().fetch_page(request).await;
        let outcome = self.store.finish_fetch(ticket, result);

        match outcome {
            FetchOutcome::Applied { page, count } => {
                info!(page, count, unread = self.store.unread_count(), "Notifications loaded");
            }
            FetchOutcome::Failed => {
                warn!(
                    page = request.page,
                    error = %self.store.error_message().unwrap_or_default(),
                    "Failed to load notifications"
                );
            }
            FetchOutcome::Stale => {
                debug!(page = request.page, "Discarded fetch result from a previous session");
            }
            FetchOutcome::InFlight | FetchOutcome::NoMorePages => {}
        }
        outcome
    }
}
