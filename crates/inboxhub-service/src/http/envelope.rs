//! Response envelope used by every endpoint of the remote service.

use serde::{Deserialize, Serialize};

/// `{statusCode, message, data, error}` wrapper around every response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    /// Application-level status code, mirrors the HTTP status.
    pub status_code: Option<u16>,
    /// Human-readable message.
    pub message: Option<String>,
    /// Payload, absent on failures and on bare acknowledgements.
    pub data: Option<T>,
    /// Error detail, shape unspecified.
    pub error: Option<serde_json::Value>,
}

impl<T> ApiEnvelope<T> {
    /// Whether the envelope reports success. A missing status code counts as success.
    pub fn is_success(&self) -> bool {
        self.status_code
            .map(|code| (200..300).contains(&code))
            .unwrap_or(true)
    }

    /// Best available failure description.
    pub fn failure_message(&self) -> Option<String> {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| match &self.error {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(serde_json::Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
    }
}
