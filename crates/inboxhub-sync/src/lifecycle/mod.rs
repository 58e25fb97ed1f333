//! Session lifecycle driven by the authentication signal.

pub mod controller;

pub use controller::LifecycleController;
