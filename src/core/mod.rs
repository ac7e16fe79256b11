//! Core types: constants, errors, and the transport capability.

pub mod constants;
pub mod error;
pub mod traits;

pub use error::{FrameError, InstallError, LinkError, ProtocolError, TransportError};
pub use traits::{CloseInfo, Payload, ReadyState, Transport, TransportEvent};
