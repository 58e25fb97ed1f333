//! # inboxhub-sync
//!
//! Client-side notification reconciliation for InboxHub. Keeps one
//! notification list consistent across three sources:
//!
//! - paged history fetched from the remote service ([`FetchCoordinator`])
//! - live pushes from the push channel ([`LifecycleController`])
//! - optimistic local mark-read changes, confirmed or rolled back ([`NotificationStore`])
//!
//! The connection state is polled from the push channel by
//! [`ConnectionStateTracker`].

pub mod bridge;
pub mod connection;
pub mod engine;
pub mod fetch;
pub mod lifecycle;
pub mod store;

pub use bridge::MemoryPushChannel;
pub use connection::ConnectionStateTracker;
pub use engine::InboxEngine;
pub use fetch::{FetchCoordinator, FetchOutcome};
pub use lifecycle::LifecycleController;
pub use store::{NotificationStore, StoreEvent, StoreSnapshot};
