//! Wire frame types and header encoding.
//!
//! Every frame begins with a 32-bit little-endian tag. Tags 1 and 3 carry a
//! u32 argument in the following four bytes; tags 2, 4 and 5 are the bare
//! tag. A DATA frame is two consecutive transport messages: the 4-byte
//! header, then the opaque payload.

use crate::core::constants::{
    SHORT_HEADER_SIZE, TAG_CLOSE, TAG_CLOSE_ACK, TAG_DATA, TAG_DATA_ACK, TAG_INITIAL_SERIAL,
    WIDE_HEADER_SIZE,
};
use crate::core::traits::Payload;

/// Frame type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FrameTag {
    /// Serial handshake; first frame on every freshly-opened transport.
    InitialSerial = TAG_INITIAL_SERIAL,
    /// Data header; one payload frame follows.
    Data = TAG_DATA,
    /// Cumulative acknowledgement.
    DataAck = TAG_DATA_ACK,
    /// Orderly shutdown request.
    Close = TAG_CLOSE,
    /// Acknowledgement of a CLOSE.
    CloseAck = TAG_CLOSE_ACK,
}

impl FrameTag {
    /// Parse a frame tag from its wire value.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            TAG_INITIAL_SERIAL => Some(Self::InitialSerial),
            TAG_DATA => Some(Self::Data),
            TAG_DATA_ACK => Some(Self::DataAck),
            TAG_CLOSE => Some(Self::Close),
            TAG_CLOSE_ACK => Some(Self::CloseAck),
            _ => None,
        }
    }

    /// Wire value of this tag.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Exact header length this tag requires.
    pub fn header_len(self) -> usize {
        match self {
            Self::InitialSerial | Self::DataAck => WIDE_HEADER_SIZE,
            Self::Data | Self::Close | Self::CloseAck => SHORT_HEADER_SIZE,
        }
    }
}

/// A fully decoded inbound wire unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// The peer's lowest retained serial.
    InitialSerial(u32),
    /// A completed data message (header + body).
    Data(Payload),
    /// Cumulative acknowledgement.
    DataAck(u32),
    /// Shutdown request.
    Close,
    /// Shutdown acknowledgement.
    CloseAck,
}

/// Encode an `INITIAL_SERIAL(lowest_unacked)` header.
pub fn initial_serial_header(lowest_unacked: u32) -> Payload {
    wide_header(FrameTag::InitialSerial, lowest_unacked)
}

/// Encode a `DATA` header. The payload frame follows as its own message.
pub fn data_header() -> Payload {
    short_header(FrameTag::Data)
}

/// Encode a `DATA_ACK(cumulative)` header.
pub fn data_ack_header(cumulative: u32) -> Payload {
    wide_header(FrameTag::DataAck, cumulative)
}

/// Encode a `CLOSE` header.
pub fn close_header() -> Payload {
    short_header(FrameTag::Close)
}

/// Encode a `CLOSE_ACK` header.
pub fn close_ack_header() -> Payload {
    short_header(FrameTag::CloseAck)
}

fn short_header(tag: FrameTag) -> Payload {
    Payload::Binary(tag.as_u32().to_le_bytes().to_vec())
}

fn wide_header(tag: FrameTag, value: u32) -> Payload {
    let mut buf = Vec::with_capacity(WIDE_HEADER_SIZE);
    buf.extend_from_slice(&tag.as_u32().to_le_bytes());
    buf.extend_from_slice(&value.to_le_bytes());
    Payload::Binary(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for tag in [
            FrameTag::InitialSerial,
            FrameTag::Data,
            FrameTag::DataAck,
            FrameTag::Close,
            FrameTag::CloseAck,
        ] {
            assert_eq!(FrameTag::from_u32(tag.as_u32()), Some(tag));
        }
        assert_eq!(FrameTag::from_u32(0), None);
        assert_eq!(FrameTag::from_u32(6), None);
    }

    #[test]
    fn test_header_lengths() {
        assert_eq!(FrameTag::InitialSerial.header_len(), 8);
        assert_eq!(FrameTag::DataAck.header_len(), 8);
        assert_eq!(FrameTag::Data.header_len(), 4);
        assert_eq!(FrameTag::Close.header_len(), 4);
        assert_eq!(FrameTag::CloseAck.header_len(), 4);
    }

    #[test]
    fn test_initial_serial_encoding() {
        let payload = initial_serial_header(0);
        assert_eq!(
            payload,
            Payload::Binary(vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
        );

        let payload = initial_serial_header(0x0102_0304);
        assert_eq!(
            payload,
            Payload::Binary(vec![0x01, 0x00, 0x00, 0x00, 0x04, 0x03, 0x02, 0x01])
        );
    }

    #[test]
    fn test_short_header_encodings() {
        assert_eq!(data_header(), Payload::Binary(vec![0x02, 0x00, 0x00, 0x00]));
        assert_eq!(close_header(), Payload::Binary(vec![0x04, 0x00, 0x00, 0x00]));
        assert_eq!(
            close_ack_header(),
            Payload::Binary(vec![0x05, 0x00, 0x00, 0x00])
        );
    }

    #[test]
    fn test_data_ack_encoding() {
        assert_eq!(
            data_ack_header(6),
            Payload::Binary(vec![0x03, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00])
        );
    }
}
