//! Collaborator traits consumed by the notification store.

pub mod push;
pub mod remote;
