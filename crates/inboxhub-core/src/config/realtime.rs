//! Push channel and connection polling configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time settings for the push channel side of the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Interval between connection state polls in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Capacity of the store event broadcast channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
}

impl RealtimeConfig {
    /// Poll interval as a [`Duration`], never shorter than 10ms.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            event_buffer_size: default_event_buffer(),
        }
    }
}

fn default_poll_interval() -> u64 {
    5000
}

fn default_event_buffer() -> usize {
    256
}
