//! # inboxhub-service
//!
//! Contracts for the two external collaborators of the notification store,
//! and a REST implementation of the first:
//!
//! - [`RemoteNotificationService`]: paged fetch, mark-one-read, mark-all-read
//! - [`PushChannel`]: connect, disconnect, subscribe and a queryable raw state
//! - [`HttpNotificationService`]: `reqwest` client for the remote service

pub mod http;
pub mod traits;

pub use http::HttpNotificationService;
pub use traits::push::{PushChannel, PushEvent, PushHandler};
pub use traits::remote::RemoteNotificationService;
