//! # inboxhub-entity
//!
//! Value types shared by the store and its collaborators: notification
//! records with their closed set of kinds, and the connection states of the
//! push channel.

pub mod connection;
pub mod notification;

pub use connection::{ChannelState, ConnectionState};
pub use notification::{NotificationKind, NotificationRecord, Subject};
