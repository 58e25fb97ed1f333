//! Push channel connection states.

pub mod state;

pub use state::{ChannelState, ConnectionState};
