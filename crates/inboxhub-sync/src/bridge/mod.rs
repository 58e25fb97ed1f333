//! Push channel implementations.

pub mod memory_push;

pub use memory_push::MemoryPushChannel;
