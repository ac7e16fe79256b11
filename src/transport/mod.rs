//! Transport plumbing: the slot holding the live connection and an
//! in-memory transport for harnesses.

pub mod memory;
pub mod slot;

pub use memory::{MemoryHandle, MemoryTransport};
pub use slot::TransportSlot;
