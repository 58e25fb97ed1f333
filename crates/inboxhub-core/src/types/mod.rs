//! Core type definitions used across the InboxHub workspace.

pub mod id;
pub mod pagination;

pub use id::{NotificationId, SessionId};
pub use pagination::{Page, PageMeta, PageRequest};
