//! REST implementation of the remote notification service.

pub mod client;
pub mod envelope;

pub use client::HttpNotificationService;
pub use envelope::ApiEnvelope;
