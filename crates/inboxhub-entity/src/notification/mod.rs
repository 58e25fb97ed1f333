//! Notification domain values.

pub mod kind;
pub mod record;

pub use kind::{NotificationKind, Subject};
pub use record::NotificationRecord;
