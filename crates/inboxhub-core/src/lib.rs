//! # inboxhub-core
//!
//! Core crate for InboxHub. Contains the unified error system, configuration
//! schemas, typed identifiers and pagination types shared by every other
//! crate in the workspace.
//!
//! This crate has **no** internal dependencies on other InboxHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
