//! Connection state polling.

pub mod tracker;

pub use tracker::ConnectionStateTracker;
