//! In-memory transport for tests and examples.
//!
//! A scriptable [`Transport`] with a shared inspection handle: the engine
//! owns the transport while the harness keeps the [`MemoryHandle`] to flip
//! its ready state, read captured frames, and observe the close call.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::error::TransportError;
use crate::core::traits::{CloseInfo, Payload, ReadyState, Transport};

#[derive(Debug)]
struct Shared {
    state: ReadyState,
    sent: Vec<Payload>,
    closed_with: Option<CloseInfo>,
    binary_frames: bool,
    buffered_amount: usize,
}

/// An in-memory message-framed endpoint.
#[derive(Debug)]
pub struct MemoryTransport {
    url: String,
    shared: Arc<Mutex<Shared>>,
}

/// Inspection and scripting handle for a [`MemoryTransport`].
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryTransport {
    /// Create a transport in the connecting state.
    pub fn new() -> (Self, MemoryHandle) {
        Self::with_state(ReadyState::Connecting)
    }

    /// Create a transport that is already open.
    pub fn open() -> (Self, MemoryHandle) {
        Self::with_state(ReadyState::Open)
    }

    fn with_state(state: ReadyState) -> (Self, MemoryHandle) {
        let shared = Arc::new(Mutex::new(Shared {
            state,
            sent: Vec::new(),
            closed_with: None,
            binary_frames: false,
            buffered_amount: 0,
        }));
        let transport = Self {
            url: "memory:".to_string(),
            shared: Arc::clone(&shared),
        };
        (transport, MemoryHandle { shared })
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Transport for MemoryTransport {
    fn ready_state(&self) -> ReadyState {
        self.shared().state
    }

    fn buffered_amount(&self) -> usize {
        self.shared().buffered_amount
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn send(&mut self, payload: Payload) -> Result<(), TransportError> {
        let mut shared = self.shared();
        if shared.state != ReadyState::Open {
            return Err(TransportError::Send("transport is not open".to_string()));
        }
        shared.sent.push(payload);
        Ok(())
    }

    fn close(&mut self, code: u16, reason: &str) {
        let mut shared = self.shared();
        shared.state = ReadyState::Closed;
        shared.closed_with = Some(CloseInfo::new(code, reason));
    }

    fn set_binary_frames(&mut self) {
        self.shared().binary_frames = true;
    }
}

impl MemoryHandle {
    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Script the transport's ready state.
    pub fn set_state(&self, state: ReadyState) {
        self.shared().state = state;
    }

    /// Script the transport's own buffer occupancy.
    pub fn set_buffered_amount(&self, amount: usize) {
        self.shared().buffered_amount = amount;
    }

    /// Take every frame the engine has sent so far.
    pub fn take_sent(&self) -> Vec<Payload> {
        std::mem::take(&mut self.shared().sent)
    }

    /// Number of frames sent and not yet taken.
    pub fn sent_len(&self) -> usize {
        self.shared().sent.len()
    }

    /// The close call the engine made, if any.
    pub fn closed_with(&self) -> Option<CloseInfo> {
        self.shared().closed_with.clone()
    }

    /// Whether the engine switched the transport to binary framing.
    pub fn binary_frames(&self) -> bool {
        self.shared().binary_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_requires_open() {
        let (mut transport, handle) = MemoryTransport::new();

        assert!(transport.send(Payload::Binary(vec![1])).is_err());

        handle.set_state(ReadyState::Open);
        transport.send(Payload::Binary(vec![1])).unwrap();
        assert_eq!(handle.take_sent(), vec![Payload::Binary(vec![1])]);
        assert_eq!(handle.sent_len(), 0);
    }

    #[test]
    fn test_close_records_descriptor() {
        let (mut transport, handle) = MemoryTransport::open();

        transport.close(1234, "test close");
        assert_eq!(transport.ready_state(), ReadyState::Closed);

        let info = handle.closed_with().unwrap();
        assert_eq!(info.code, 1234);
        assert_eq!(info.reason, "test close");
    }
}
