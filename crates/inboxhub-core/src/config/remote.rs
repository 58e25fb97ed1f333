//! Remote notification service configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the REST notification service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote service, without the API prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path prefix prepended to every endpoint.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Bearer token. Its presence is the authentication signal.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl RemoteConfig {
    /// Whether a non-empty access token is configured.
    pub fn is_authenticated(&self) -> bool {
        self.access_token
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            access_token: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_request_timeout() -> u64 {
    15
}
