//! Fetch coordination: initial load, refresh and load-more.

pub mod coordinator;

pub use coordinator::{FetchCoordinator, FetchOutcome};
