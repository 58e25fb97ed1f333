//! Convenience result type alias for InboxHub.

use crate::error::AppError;

/// A specialized `Result` type for InboxHub operations.
pub type AppResult<T> = Result<T, AppError>;
