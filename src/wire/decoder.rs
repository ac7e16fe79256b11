//! Incremental frame decoding.
//!
//! Headers and bodies arrive as separate transport messages. The decoder
//! holds at most one pending DATA header: with no header pending, an
//! incoming message is interpreted as a header; with one pending, the
//! incoming message is the body and completes the frame. Header-only
//! frames decode immediately.

use crate::core::error::FrameError;
use crate::core::traits::Payload;
use crate::wire::frame::{Frame, FrameTag};

/// Stateful decoder pairing DATA headers with their bodies.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    awaiting_body: bool,
}

impl FrameDecoder {
    /// Create a decoder with no header pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a DATA header is waiting for its body.
    pub fn is_awaiting_body(&self) -> bool {
        self.awaiting_body
    }

    /// Drop any pending header. Called when the transport cycles: the peer
    /// replays the full DATA pair on the next connection, so a half-framed
    /// message must not swallow the new connection's handshake.
    pub fn reset(&mut self) {
        self.awaiting_body = false;
    }

    /// Feed one transport message.
    ///
    /// Returns `Ok(None)` when a DATA header was consumed and its body is
    /// still outstanding.
    pub fn push(&mut self, payload: Payload) -> Result<Option<Frame>, FrameError> {
        if self.awaiting_body {
            self.awaiting_body = false;
            return Ok(Some(Frame::Data(payload)));
        }

        let bytes = match &payload {
            Payload::Binary(bytes) => bytes,
            Payload::Text(_) => return Err(FrameError::BodyWithoutHeader),
        };

        if bytes.len() < 4 {
            return Err(FrameError::HeaderTooShort { len: bytes.len() });
        }

        let raw = u32::from_le_bytes(bytes[..4].try_into().unwrap());
        let tag = FrameTag::from_u32(raw).ok_or(FrameError::UnknownTag { tag: raw })?;

        let expected = tag.header_len();
        if bytes.len() != expected {
            return Err(FrameError::HeaderLength {
                tag: raw,
                expected,
                actual: bytes.len(),
            });
        }

        let frame = match tag {
            FrameTag::InitialSerial => Frame::InitialSerial(read_arg(bytes)),
            FrameTag::DataAck => Frame::DataAck(read_arg(bytes)),
            FrameTag::Close => Frame::Close,
            FrameTag::CloseAck => Frame::CloseAck,
            FrameTag::Data => {
                self.awaiting_body = true;
                return Ok(None);
            }
        };

        tracing::trace!(?frame, "decoded control frame");
        Ok(Some(frame))
    }
}

fn read_arg(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes[4..8].try_into().unwrap())
}
