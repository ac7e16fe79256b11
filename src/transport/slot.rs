//! Single-occupancy holder for the live transport.
//!
//! The engine talks to at most one underlying connection at a time. The
//! slot validates installs, detaches the previous occupant on replace, and
//! forwards frames only while the occupant is open.

use crate::core::error::{InstallError, TransportError};
use crate::core::traits::{Payload, ReadyState, Transport};

/// Holds the current transport, if any.
#[derive(Default)]
pub struct TransportSlot {
    current: Option<Box<dyn Transport>>,
}

impl std::fmt::Debug for TransportSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSlot")
            .field("occupied", &self.current.is_some())
            .finish()
    }
}

impl TransportSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a transport, replacing and detaching any previous occupant.
    ///
    /// The new transport is switched to binary framing. Installing a
    /// transport that is already closing or closed is a programmer error.
    /// Returns the installed transport's ready state.
    pub fn install(&mut self, mut transport: Box<dyn Transport>) -> Result<ReadyState, InstallError> {
        let state = transport.ready_state();
        if matches!(state, ReadyState::Closing | ReadyState::Closed) {
            return Err(InstallError::TransportNotUsable { state });
        }

        transport.set_binary_frames();
        self.current = Some(transport);
        Ok(state)
    }

    /// Remove and return the current transport.
    pub fn detach(&mut self) -> Option<Box<dyn Transport>> {
        self.current.take()
    }

    /// Whether a transport is attached.
    pub fn is_attached(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the attached transport is open.
    pub fn is_open(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|t| t.ready_state() == ReadyState::Open)
    }

    /// Forward a frame if the transport is open.
    ///
    /// Returns whether the frame was handed to the transport; `false`
    /// means the slot is empty or not open and the caller's buffer will
    /// cover the frame on the next replay.
    pub fn send(&mut self, frame: Payload) -> Result<bool, TransportError> {
        match self.current.as_mut() {
            Some(transport) if transport.ready_state() == ReadyState::Open => {
                transport.send(frame)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Close the attached transport, if any.
    pub fn close(&mut self, code: u16, reason: &str) {
        if let Some(transport) = self.current.as_mut() {
            transport.close(code, reason);
        }
    }

    /// The attached transport's own send buffer occupancy.
    pub fn buffered_amount(&self) -> usize {
        self.current.as_ref().map_or(0, |t| t.buffered_amount())
    }

    /// URL of the attached transport.
    pub fn url(&self) -> Option<&str> {
        self.current.as_deref().map(Transport::url)
    }

    /// Negotiated extensions of the attached transport.
    pub fn extensions(&self) -> Option<&str> {
        self.current.as_deref().map(Transport::extensions)
    }

    /// Negotiated subprotocol of the attached transport.
    pub fn protocol(&self) -> Option<&str> {
        self.current.as_deref().map(Transport::protocol)
    }
}
