//! Notification store: list, counters, connection state and error slot.

pub mod events;
pub mod notification_store;
pub mod state;

pub use events::{StoreEvent, StoreSnapshot};
pub use notification_store::NotificationStore;
pub use state::{FetchMode, FetchTicket, StoreState};
