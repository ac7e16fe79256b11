//! Wire format: frame types, header encoding, incremental decoding.

pub mod decoder;
pub mod frame;

pub use decoder::FrameDecoder;
pub use frame::{
    close_ack_header, close_header, data_ack_header, data_header, initial_serial_header, Frame,
    FrameTag,
};
