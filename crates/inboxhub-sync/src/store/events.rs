//! Change notifications and read-only views published by the store.

use serde::Serialize;

use inboxhub_core::types::{NotificationId, PageMeta};
use inboxhub_entity::{ConnectionState, NotificationRecord};

/// A state change published to store subscribers.
///
/// Emitted only when something actually changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The list was replaced by a freshly fetched first page.
    Replaced {
        /// Records now in the list.
        count: usize,
        /// Unread counter after the replace.
        unread: u64,
    },
    /// A further page was appended at the tail.
    Appended {
        /// Page number appended.
        page: u64,
        /// Records appended.
        count: usize,
        /// Unread counter after the append.
        unread: u64,
    },
    /// A pushed record was inserted at the head.
    Pushed {
        /// Id of the inserted record.
        id: NotificationId,
        /// Unread counter after the insert.
        unread: u64,
    },
    /// An optimistic mark-read flipped one or more records.
    ReadStateChanged {
        /// Unread counter after the flip.
        unread: u64,
    },
    /// A rejected mark-read was reverted.
    RolledBack {
        /// Unread counter after the rollback.
        unread: u64,
    },
    /// The connection state changed.
    ConnectionChanged(ConnectionState),
    /// The error slot changed.
    ErrorChanged(Option<String>),
    /// A fetch or mark-all round-trip started or finished.
    LoadingChanged {
        /// A fetch is in flight.
        loading: bool,
        /// A mark-all round-trip is in flight.
        marking_all: bool,
    },
    /// The store was cleared for a new session.
    Reset {
        /// Epoch of the new session.
        epoch: u64,
    },
}

/// Owned, point-in-time copy of the store state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Records, newest first.
    pub records: Vec<NotificationRecord>,
    /// Pagination metadata from the last successful fetch.
    pub meta: PageMeta,
    /// Maintained unread counter.
    pub unread_count: u64,
    /// Current connection state.
    pub connection: ConnectionState,
    /// Message in the error slot.
    pub error: Option<String>,
    /// A fetch is in flight.
    pub loading: bool,
    /// A mark-all round-trip is in flight.
    pub marking_all: bool,
    /// Session epoch.
    pub epoch: u64,
}

impl StoreSnapshot {
    /// Unread records counted from scratch, for checking the maintained counter.
    pub fn counted_unread(&self) -> u64 {
        self.records.iter().filter(|r| r.is_unread()).count() as u64
    }

    /// Whether the maintained counter agrees with a full recount.
    pub fn unread_is_consistent(&self) -> bool {
        self.unread_count == self.counted_unread()
    }
}
