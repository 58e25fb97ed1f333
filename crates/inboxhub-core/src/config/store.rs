//! Notification store configuration.

use serde::{Deserialize, Serialize};

/// Settings for the notification store and its fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Page size requested from the remote service.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Drop pushed records whose id is already in the list.
    ///
    /// Off by default: pushed and fetched copies of one record are both kept.
    #[serde(default)]
    pub dedupe_pushed: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            dedupe_pushed: false,
        }
    }
}

fn default_page_size() -> u64 {
    10
}
