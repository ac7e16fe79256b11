//! The transport capability consumed by the protocol engine.
//!
//! The engine never establishes connections itself. It is handed objects
//! implementing [`Transport`] (a web-socket-like endpoint that preserves
//! message boundaries) and is driven by the [`TransportEvent`] stream the
//! host adapter extracts from that endpoint.

use super::constants::{CLOSE_CODE_ABNORMAL, CLOSE_CODE_NORMAL};
use super::error::TransportError;

/// An application payload or wire frame: one transport message.
///
/// The transport distinguishes binary and textual messages and the engine
/// preserves that distinction end to end. Headers are always binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Text, delivered as text on the remote side.
    Text(String),
}

impl Payload {
    /// Message size: byte length for binary, character count for text.
    pub fn size(&self) -> usize {
        match self {
            Payload::Binary(bytes) => bytes.len(),
            Payload::Text(text) => text.chars().count(),
        }
    }

    /// Whether this is a binary message.
    pub fn is_binary(&self) -> bool {
        matches!(self, Payload::Binary(_))
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Binary(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Binary(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

/// Lifecycle state of a transport or of the engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Connection not yet established.
    Connecting,
    /// Connected, data transfer active.
    Open,
    /// Close handshake in progress.
    Closing,
    /// Terminal state; the object is inert.
    Closed,
}

/// A close descriptor: the code/reason pair delivered with a close event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// Close code (web-socket numbering).
    pub code: u16,
    /// Human-readable reason.
    pub reason: String,
}

impl CloseInfo {
    /// Create a close descriptor.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Normal closure with an empty reason.
    pub fn normal() -> Self {
        Self::new(CLOSE_CODE_NORMAL, "")
    }

    /// Abnormal closure with an empty reason.
    pub fn abnormal() -> Self {
        Self::new(CLOSE_CODE_ABNORMAL, "")
    }
}

/// One event observed on the underlying transport.
///
/// Host adapters translate the endpoint's native callbacks into this enum
/// and feed it to the engine's single step entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection reached its open state.
    Open,
    /// One complete transport message arrived.
    Message(Payload),
    /// The transport reported a failure.
    Error(TransportError),
    /// The connection closed.
    Closed {
        /// Close code reported by the transport.
        code: u16,
        /// Close reason reported by the transport.
        reason: String,
        /// Whether the close handshake completed cleanly.
        clean: bool,
    },
}

/// A message-framed bidirectional endpoint (web-socket-like).
///
/// # Requirements
///
/// - `send` MUST preserve message boundaries and the binary/text kind.
/// - Observables reflect the endpoint's own view; the engine keeps its
///   separate [`ReadyState`](ReadyState) for the logical link.
/// - After `close` the endpoint delivers no further messages.
pub trait Transport: Send {
    /// Current connection state of this endpoint.
    fn ready_state(&self) -> ReadyState;

    /// Bytes accepted by `send` but not yet put on the wire.
    fn buffered_amount(&self) -> usize;

    /// The URL this endpoint is connected to.
    fn url(&self) -> &str;

    /// Negotiated extensions, if any.
    fn extensions(&self) -> &str {
        ""
    }

    /// Negotiated subprotocol, if any.
    fn protocol(&self) -> &str {
        ""
    }

    /// Send one message.
    fn send(&mut self, payload: Payload) -> Result<(), TransportError>;

    /// Close the connection with the given code and reason.
    fn close(&mut self, code: u16, reason: &str);

    /// Switch the receive side to raw byte buffers for binary messages.
    fn set_binary_frames(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_size_binary() {
        let payload = Payload::Binary(vec![1, 2, 3, 4, 5]);
        assert_eq!(payload.size(), 5);
    }

    #[test]
    fn test_payload_size_text_counts_chars() {
        // Multi-byte characters count once each.
        let payload = Payload::Text("héllo".to_string());
        assert_eq!(payload.size(), 5);
    }

    #[test]
    fn test_payload_from_conversions() {
        assert!(Payload::from(vec![1u8]).is_binary());
        assert!(Payload::from(&[1u8][..]).is_binary());
        assert!(!Payload::from("hi").is_binary());
        assert!(!Payload::from(String::from("hi")).is_binary());
    }

    #[test]
    fn test_close_info_defaults() {
        assert_eq!(CloseInfo::normal().code, CLOSE_CODE_NORMAL);
        assert_eq!(CloseInfo::abnormal().code, CLOSE_CODE_ABNORMAL);
        assert!(CloseInfo::normal().reason.is_empty());
    }
}
