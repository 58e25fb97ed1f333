//! Connection state definitions.

use serde::{Deserialize, Serialize};

/// Raw state reported by a push channel client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelState {
    /// The socket is open and subscriptions are live.
    Connected,
    /// A connection attempt is in progress.
    Connecting,
    /// The client is closing the socket.
    Disconnecting,
    /// The socket is closed.
    Disconnected,
    /// The client cannot tell.
    Unknown,
}

/// Connection state published by the store to the UI.
///
/// Starts `Disconnected`. Polls only ever produce the first three values;
/// `Error` is entered explicitly when a hard channel failure is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// Not connected.
    #[default]
    Disconnected,
    /// Connecting, disconnecting or in an unknown transitional state.
    Connecting,
    /// Connected.
    Connected,
    /// The channel reported a hard failure.
    Error,
}

impl ConnectionState {
    /// Converts to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::Error => "ERROR",
        }
    }
}

impl From<ChannelState> for ConnectionState {
    fn from(raw: ChannelState) -> Self {
        match raw {
            ChannelState::Connected => Self::Connected,
            ChannelState::Connecting | ChannelState::Disconnecting | ChannelState::Unknown => {
                Self::Connecting
            }
            ChannelState::Disconnected => Self::Disconnected,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
