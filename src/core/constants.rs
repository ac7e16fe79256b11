//! Protocol constants for the relink wire format and engine defaults.

use std::time::Duration;

// =============================================================================
// FRAME TAGS
// =============================================================================

/// Serial handshake: first frame on every freshly-opened transport.
pub const TAG_INITIAL_SERIAL: u32 = 1;

/// Data header; one opaque payload frame follows.
pub const TAG_DATA: u32 = 2;

/// Cumulative acknowledgement of received frames.
pub const TAG_DATA_ACK: u32 = 3;

/// Orderly shutdown request.
pub const TAG_CLOSE: u32 = 4;

/// Acknowledgement of a CLOSE.
pub const TAG_CLOSE_ACK: u32 = 5;

// =============================================================================
// HEADER SIZES
// =============================================================================

/// Header size for tag-only frames (DATA, CLOSE, CLOSE_ACK).
pub const SHORT_HEADER_SIZE: usize = 4;

/// Header size for frames carrying a u32 argument (INITIAL_SERIAL, DATA_ACK).
pub const WIDE_HEADER_SIZE: usize = 8;

// =============================================================================
// CLOSE CODES
// =============================================================================

/// Normal closure.
pub const CLOSE_CODE_NORMAL: u16 = 1000;

/// Abnormal closure (no close handshake completed).
pub const CLOSE_CODE_ABNORMAL: u16 = 1006;

// =============================================================================
// ENGINE DEFAULTS
// =============================================================================

/// Acknowledge once this many unacked inbound bytes have accumulated.
pub const DEFAULT_MAX_UNACK_BYTES: usize = 100_000;

/// Acknowledge once this many unacked inbound messages have accumulated.
pub const DEFAULT_MAX_UNACK_MESSAGES: usize = 100;

/// Acknowledge at latest this long after the first unacked inbound message.
pub const DEFAULT_MAX_UNACK_TIME: Duration = Duration::from_secs(10);

/// How long to wait for a reconnect or a close acknowledgement before
/// forcing the link closed.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(60);

/// Delay between reconnect attempts when a transport factory is configured.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(250);
