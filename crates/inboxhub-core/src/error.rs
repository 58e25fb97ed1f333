//! Unified application error types for InboxHub.
//!
//! Remote collaborators report failures as [`AppError`]. The notification
//! store never propagates them further: it folds them into one of the three
//! store-level kinds ([`ErrorKind::Fetch`], [`ErrorKind::MutationRejected`],
//! [`ErrorKind::Channel`]) and publishes the result in its error slot.

use std::fmt;
use thiserror::Error;

/// Error categorization used across the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Remote list retrieval failed; the list is untouched and the fetch is retryable.
    Fetch,
    /// A mark-read round-trip failed and local state was rolled back.
    MutationRejected,
    /// The push transport reported a hard failure.
    Channel,
    /// The network link failed (connect, timeout, reset).
    Transport,
    /// The remote service rejected the credentials.
    Authentication,
    /// The remote service answered with a non-success status.
    Remote,
    /// A payload could not be encoded or decoded.
    Serialization,
    /// A configuration error occurred.
    Configuration,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "FETCH"),
            Self::MutationRejected => write!(f, "MUTATION_REJECTED"),
            Self::Channel => write!(f, "CHANNEL"),
            Self::Transport => write!(f, "TRANSPORT"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Remote => write!(f, "REMOTE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout InboxHub.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    /// Create a rejected-mutation error.
    pub fn mutation_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MutationRejected, message)
    }

    /// Create a push channel error.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Channel, message)
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create a remote-rejection error.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Remote, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether the failure means the network link itself is gone.
    pub fn is_link_failure(&self) -> bool {
        self.kind == ErrorKind::Transport
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl PartialEq for AppError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
