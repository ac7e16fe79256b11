//! The protocol engine: pending buffer, inbound tracking, ack policy,
//! close handshake, and the [`Retransmitter`] façade composing them.

pub mod ack;
pub mod buffer;
pub mod close;
pub mod config;
pub mod inbound;
pub mod retransmitter;

pub use ack::AckSchedule;
pub use buffer::SendBuffer;
pub use close::CloseHandshake;
pub use config::{RetransmitterConfig, RetransmitterConfigBuilder};
pub use inbound::ReceiveTracker;
pub use retransmitter::{Event, Retransmitter};
