//! Error types for the relink protocol engine.

use thiserror::Error;

use super::traits::ReadyState;

/// Errors raised while decoding incoming transport messages into frames.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A header frame shorter than the 4-byte tag.
    #[error("header too short: {len} bytes, need at least 4")]
    HeaderTooShort {
        /// Length of the received message.
        len: usize,
    },

    /// The leading u32 is not a known frame tag.
    #[error("unknown frame tag {tag}")]
    UnknownTag {
        /// The tag value that was received.
        tag: u32,
    },

    /// A known tag arrived with the wrong header length.
    #[error("tag {tag} header must be {expected} bytes, got {actual}")]
    HeaderLength {
        /// The frame tag.
        tag: u32,
        /// Header length the tag requires.
        expected: usize,
        /// Header length received.
        actual: usize,
    },

    /// A text message arrived with no data header pending.
    #[error("text frame received with no data header pending")]
    BodyWithoutHeader,
}

/// Fatal protocol violations by the peer.
///
/// Any of these means the two engines have lost agreement on the frame
/// stream; there is no mid-stream recovery and the link transitions to
/// closed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The incoming message could not be framed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The peer acknowledged serials we no longer retain.
    #[error("cumulative ack {cumulative} is below the retained window base {lowest}")]
    AckBelowWindow {
        /// Cumulative value received.
        cumulative: u32,
        /// Lowest serial still buffered locally.
        lowest: u32,
    },

    /// The peer acknowledged serials we never sent.
    #[error("cumulative ack {cumulative} exceeds the next outbound serial {next}")]
    AckBeyondWindow {
        /// Cumulative value received.
        cumulative: u32,
        /// Serial the next outbound frame would take.
        next: u32,
    },

    /// A CLOSE_ACK arrived with no close handshake in flight.
    #[error("received CLOSE_ACK with no close in flight")]
    CloseAckWithoutClose,
}

/// Failures reported by the underlying transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// A send on the transport failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Establishing the connection failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Programmer misuse of `use_transport`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InstallError {
    /// The transport being installed is already shutting down.
    #[error("cannot install a transport that is already {state:?}")]
    TransportNotUsable {
        /// Ready state of the rejected transport.
        state: ReadyState,
    },

    /// The link has reached its terminal state and is inert.
    #[error("the link is closed and cannot accept a transport")]
    LinkClosed,
}

/// Top-level error surfaced to the application.
///
/// The application observes at most one `Error` event, immediately before
/// the final `Close` event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The peer violated the frame protocol.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    /// The transport failed.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}
