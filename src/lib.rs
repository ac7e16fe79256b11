//! # relink
//!
//! Exactly-once, order-preserving, reliable message delivery over an
//! unreliable, reconnecting bidirectional transport (a web-socket-like
//! connection that preserves message boundaries).
//!
//! Two peers each wrap their endpoint in a [`Retransmitter`]. Payloads
//! handed to the local side reach the remote application exactly once and
//! in order, even when the underlying connection drops, reconnects, or is
//! swapped for a fresh one mid-session:
//!
//! - **Handshake**: every freshly-opened transport starts with an
//!   `INITIAL_SERIAL` frame re-aligning both sides' serial views.
//! - **Retransmit**: unacknowledged frames are retained and replayed in
//!   order on every reconnect; the receiver suppresses duplicates by
//!   serial comparison.
//! - **Batched acks**: acknowledgements coalesce until a byte, count, or
//!   time bound is crossed.
//! - **Two-phase close**: an orderly shutdown survives reconnects and is
//!   bounded by a close timeout.
//!
//! ## Modules
//!
//! - [`core`]: constants, error taxonomy, and the [`Transport`] capability
//! - [`wire`]: frame types and the incremental decoder
//! - [`link`]: the protocol engine
//! - [`transport`]: the transport slot and an in-memory transport
//! - [`driver`]: tokio event loop with reconnect (requires the `driver`
//!   feature)
//!
//! ## Example
//!
//! ```rust
//! use std::time::Instant;
//! use relink::prelude::*;
//! use relink::transport::MemoryTransport;
//!
//! let mut link = Retransmitter::new(RetransmitterConfig::default());
//!
//! // Payloads queue until a transport opens, then replay in order.
//! link.send(Payload::Binary(vec![0x05]));
//!
//! let (transport, wire) = MemoryTransport::open();
//! link.use_transport_at(Box::new(transport), Instant::now()).unwrap();
//!
//! assert_eq!(link.ready_state(), ReadyState::Open);
//! assert_eq!(wire.take_sent().len(), 3); // handshake + header + body
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod core;
pub mod link;
pub mod transport;
pub mod wire;

// Reconnect driver (feature-gated)
#[cfg(feature = "driver")]
pub mod driver;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        CloseInfo, FrameError, InstallError, LinkError, Payload, ProtocolError, ReadyState,
        Transport, TransportError, TransportEvent,
    };
    pub use crate::link::{Event, Retransmitter, RetransmitterConfig};

    #[cfg(feature = "driver")]
    pub use crate::driver::{LinkDriver, LinkEvents, LinkHandle, TransportFactory};
}

// Re-export commonly used items at crate root
pub use crate::core::{CloseInfo, LinkError, Payload, ReadyState, Transport, TransportEvent};
pub use crate::link::{Event, Retransmitter, RetransmitterConfig};
