//! The Retransmitter protocol engine.
//!
//! Owns all protocol state and composes the framing decoder, the outbound
//! pending buffer, the inbound serial tracker, the ack schedule, the close
//! handshake, and the transport slot. The engine is single-threaded and
//! sans-IO: transport events, timer expiries, and application calls are
//! explicit entry points, each processing one step to completion. Time is
//! passed in, so every step is deterministic.

use std::collections::VecDeque;
use std::time::Instant;

use crate::core::error::{InstallError, LinkError, ProtocolError, TransportError};
use crate::core::traits::{CloseInfo, Payload, ReadyState, Transport, TransportEvent};
use crate::link::ack::AckSchedule;
use crate::link::buffer::SendBuffer;
use crate::link::close::CloseHandshake;
use crate::link::config::RetransmitterConfig;
use crate::link::inbound::ReceiveTracker;
use crate::transport::slot::TransportSlot;
use crate::wire::decoder::FrameDecoder;
use crate::wire::frame::{
    close_ack_header, close_header, data_ack_header, data_header, initial_serial_header, Frame,
};

/// An application-visible event.
///
/// The application observes each sent payload exactly once via `Message`,
/// at most one `Error`, and exactly one terminal `Close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The link reached its open state for the first time.
    Open,
    /// One application payload, in send order, delivered exactly once.
    Message(Payload),
    /// The failure that accompanied the link's shutdown.
    Error(LinkError),
    /// The link is closed; no further events follow.
    Close {
        /// Close code.
        code: u16,
        /// Close reason.
        reason: String,
    },
}

/// Reliable, exactly-once, order-preserving delivery over a reconnecting
/// transport.
///
/// Payloads handed to [`send`](Self::send) reach the remote application
/// exactly once and in order, surviving transport drops, reconnects, and
/// explicit transport swaps. Created in `Connecting`; inert after
/// `Closed`.
#[derive(Debug)]
pub struct Retransmitter {
    config: RetransmitterConfig,
    state: ReadyState,
    slot: TransportSlot,
    decoder: FrameDecoder,
    buffer: SendBuffer,
    inbound: ReceiveTracker,
    ack: AckSchedule,
    close: CloseHandshake,
    /// Set once the current transport's open step has run; frames are
    /// forwarded only afterwards, so INITIAL_SERIAL is always the first
    /// frame on every connection.
    wire_ready: bool,
    last_transport_close: Option<CloseInfo>,
    pending_error: Option<LinkError>,
    events: VecDeque<Event>,
}

impl Retransmitter {
    /// Create an engine with the given configuration. No transport is
    /// attached yet; install one with [`use_transport`](Self::use_transport).
    pub fn new(config: RetransmitterConfig) -> Self {
        let ack = AckSchedule::new(
            config.max_unack_bytes,
            config.max_unack_messages,
            config.max_unack_time,
        );
        let close = CloseHandshake::new(config.close_timeout);
        Self {
            config,
            state: ReadyState::Connecting,
            slot: TransportSlot::new(),
            decoder: FrameDecoder::new(),
            buffer: SendBuffer::new(),
            inbound: ReceiveTracker::new(),
            ack,
            close,
            wire_ready: false,
            last_transport_close: None,
            pending_error: None,
            events: VecDeque::new(),
        }
    }

    // -------------------------------------------------------------------
    // Read-only surface
    // -------------------------------------------------------------------

    /// Lifecycle state of the link.
    pub fn ready_state(&self) -> ReadyState {
        self.state
    }

    /// Pending frame sizes plus the current transport's own buffer.
    pub fn buffered_amount(&self) -> usize {
        self.buffer.total_size() + self.slot.buffered_amount()
    }

    /// URL of the attached transport.
    pub fn url(&self) -> Option<&str> {
        self.slot.url()
    }

    /// Negotiated extensions of the attached transport.
    pub fn extensions(&self) -> Option<&str> {
        self.slot.extensions()
    }

    /// Negotiated subprotocol of the attached transport.
    pub fn protocol(&self) -> Option<&str> {
        self.slot.protocol()
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &RetransmitterConfig {
        &self.config
    }

    /// Pop the next application-visible event.
    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Earliest armed timer deadline (unack or close guard), if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.ack.deadline(), self.close.guard_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // -------------------------------------------------------------------
    // Application surface
    // -------------------------------------------------------------------

    /// Enqueue an application payload.
    ///
    /// The payload is buffered until the peer acknowledges it and is
    /// forwarded immediately when the transport is open. Ignored with a
    /// warning once the link is closing.
    pub fn send(&mut self, payload: Payload) {
        if !matches!(self.state, ReadyState::Connecting | ReadyState::Open) {
            tracing::warn!(state = ?self.state, "send ignored; link is shutting down");
            return;
        }
        self.push_and_forward(data_header());
        self.push_and_forward(payload);
    }

    /// Initiate orderly shutdown. See [`close_at`](Self::close_at).
    pub fn close(&mut self, code: u16, reason: &str) {
        self.close_at(code, reason, Instant::now());
    }

    /// Initiate orderly shutdown at the given time.
    ///
    /// Enqueues a CLOSE frame (replayed on reconnect like data), arms the
    /// close guard, and records the descriptor delivered with the final
    /// close event. A second call is a warned no-op.
    pub fn close_at(&mut self, code: u16, reason: &str, now: Instant) {
        if !matches!(self.state, ReadyState::Connecting | ReadyState::Open) {
            tracing::warn!(state = ?self.state, "close ignored; link already closing or closed");
            return;
        }

        tracing::debug!(code, reason, "closing link");
        self.state = ReadyState::Closing;
        self.close.begin_local(CloseInfo::new(code, reason), now);
        self.push_and_forward(close_header());
    }

    /// Install or replace the transport. See
    /// [`use_transport_at`](Self::use_transport_at).
    pub fn use_transport(&mut self, transport: Box<dyn Transport>) -> Result<(), InstallError> {
        self.use_transport_at(transport, Instant::now())
    }

    /// Install or replace the transport at the given time.
    ///
    /// Any prior transport is detached first. If the new transport is
    /// already open, an open step runs immediately — including while the
    /// link is closing, so a mid-close replacement replays the pending
    /// CLOSE. Installing a closing/closed transport, or installing into a
    /// closed link, fails.
    pub fn use_transport_at(
        &mut self,
        transport: Box<dyn Transport>,
        now: Instant,
    ) -> Result<(), InstallError> {
        if self.state == ReadyState::Closed {
            return Err(InstallError::LinkClosed);
        }

        let transport_state = self.slot.install(transport)?;
        self.wire_ready = false;
        if transport_state == ReadyState::Open {
            self.handle_open_at(now);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Step entry points (transport events and timers)
    // -------------------------------------------------------------------

    /// Process one transport event. See [`handle_event_at`](Self::handle_event_at).
    pub fn handle_event(&mut self, event: TransportEvent) -> Result<(), ProtocolError> {
        self.handle_event_at(event, Instant::now())
    }

    /// Process one transport event at the given time.
    pub fn handle_event_at(
        &mut self,
        event: TransportEvent,
        now: Instant,
    ) -> Result<(), ProtocolError> {
        match event {
            TransportEvent::Open => {
                self.handle_open_at(now);
                Ok(())
            }
            TransportEvent::Message(payload) => self.handle_message_at(payload, now),
            TransportEvent::Error(err) => {
                self.handle_error(err);
                Ok(())
            }
            TransportEvent::Closed {
                code,
                reason,
                clean,
            } => {
                self.handle_close_at(code, &reason, clean, now);
                Ok(())
            }
        }
    }

    /// The transport reached its open state. See
    /// [`handle_open_at`](Self::handle_open_at).
    pub fn handle_open(&mut self) {
        self.handle_open_at(Instant::now());
    }

    /// The transport reached its open state at the given time.
    ///
    /// Sends `INITIAL_SERIAL(buffer_lowest_serial)` and replays every
    /// pending frame in order. Cancels the close guard unless the link is
    /// already closing.
    pub fn handle_open_at(&mut self, now: Instant) {
        if self.state == ReadyState::Closed {
            return;
        }

        // A fresh connection starts a fresh framing context; the peer
        // replays any half-framed data message in full.
        self.decoder.reset();
        let _ = now;

        if self.state != ReadyState::Closing {
            self.close.cancel_guard();
        }
        if self.state == ReadyState::Connecting {
            self.state = ReadyState::Open;
            self.events.push_back(Event::Open);
        }

        tracing::debug!(
            lowest = self.buffer.lowest_serial(),
            pending = self.buffer.len(),
            "transport open; replaying pending frames"
        );

        self.wire_ready = true;
        let mut frames = Vec::with_capacity(self.buffer.len() + 1);
        frames.push(initial_serial_header(self.buffer.lowest_serial()));
        frames.extend(self.buffer.iter().cloned());
        for frame in frames {
            self.forward(frame);
        }
    }

    /// One transport message arrived. See
    /// [`handle_message_at`](Self::handle_message_at).
    pub fn handle_message(&mut self, payload: Payload) -> Result<(), ProtocolError> {
        self.handle_message_at(payload, Instant::now())
    }

    /// One transport message arrived at the given time.
    ///
    /// A returned error is fatal: the peer has desynced and the engine has
    /// already transitioned to closed, surfacing the error to the
    /// application.
    pub fn handle_message_at(
        &mut self,
        payload: Payload,
        now: Instant,
    ) -> Result<(), ProtocolError> {
        if self.state == ReadyState::Closed {
            return Ok(());
        }

        let frame = match self.decoder.push(payload) {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(()),
            Err(err) => {
                let err = ProtocolError::from(err);
                self.fail(err.clone());
                return Err(err);
            }
        };

        match frame {
            Frame::InitialSerial(lowest) => {
                self.inbound.realign(lowest);
                Ok(())
            }
            Frame::DataAck(cumulative) => match self.buffer.acknowledge(cumulative) {
                Ok(dropped) => {
                    tracing::trace!(cumulative, dropped, "acknowledged");
                    Ok(())
                }
                Err(err) => {
                    self.fail(err.clone());
                    Err(err)
                }
            },
            Frame::Data(body) => {
                self.on_data(body, now);
                Ok(())
            }
            Frame::Close => {
                self.on_peer_close();
                Ok(())
            }
            Frame::CloseAck => self.on_close_ack(),
        }
    }

    /// The transport reported a failure.
    ///
    /// Transport errors never kill the link; the most recent one is held
    /// back and surfaced immediately before the final close event.
    pub fn handle_error(&mut self, err: TransportError) {
        if self.state == ReadyState::Closed {
            return;
        }
        self.note_transport_error(err);
    }

    /// The transport closed. See [`handle_close_at`](Self::handle_close_at).
    pub fn handle_close(&mut self, code: u16, reason: &str, clean: bool) {
        self.handle_close_at(code, reason, clean, Instant::now());
    }

    /// The transport closed at the given time.
    ///
    /// Not an application-visible error: the transport is detached and the
    /// close guard is armed (if not already) to bound the wait for a
    /// reconnect or the peer's CLOSE_ACK. The link stays usable and will
    /// replay on the next transport.
    pub fn handle_close_at(&mut self, code: u16, reason: &str, clean: bool, now: Instant) {
        if self.state == ReadyState::Closed {
            return;
        }

        tracing::debug!(code, clean, "transport closed; awaiting replacement");
        self.wire_ready = false;
        self.slot.detach();
        self.decoder.reset();
        self.last_transport_close = Some(CloseInfo::new(code, reason));
        self.close.arm(now);
    }

    /// Fire any timer whose deadline has passed.
    pub fn handle_timeout(&mut self) {
        self.handle_timeout_at(Instant::now());
    }

    /// Fire any timer whose deadline has passed at the given time.
    ///
    /// Late or spurious wakeups are harmless: nothing fires unless an
    /// armed deadline has actually elapsed.
    pub fn handle_timeout_at(&mut self, now: Instant) {
        if self.state == ReadyState::Closed {
            return;
        }

        if self.ack.is_due(now) {
            self.send_ack();
        }

        if self.close.guard_due(now) {
            let info = self
                .close
                .take_pending()
                .or_else(|| self.last_transport_close.take())
                .unwrap_or_else(CloseInfo::abnormal);
            tracing::debug!(code = info.code, "close guard expired; forcing link closed");
            self.finalize(info);
        }
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    fn on_data(&mut self, body: Payload, now: Instant) {
        let fresh = self.inbound.accept_data();
        let size = body.size();

        if fresh && self.state == ReadyState::Open {
            self.inbound.mark_processed();
            self.events.push_back(Event::Message(body));
        }

        // Duplicates still feed the accumulators: replayed frames are
        // retained on the peer until re-acknowledged.
        let threshold = self.ack.on_data(size, now, self.state == ReadyState::Open);
        if threshold {
            self.send_ack();
        }
    }

    fn on_peer_close(&mut self) {
        self.inbound.accept_control();
        self.push_and_forward(close_ack_header());

        match self.state {
            ReadyState::Connecting | ReadyState::Open => {
                self.finalize(CloseInfo::normal());
            }
            // Simultaneous close: our own CLOSE is still in flight; the
            // peer's CLOSE_ACK or the guard finishes the shutdown.
            ReadyState::Closing | ReadyState::Closed => {}
        }
    }

    fn on_close_ack(&mut self) -> Result<(), ProtocolError> {
        self.inbound.accept_control();
        match self.close.acknowledge() {
            Some(info) => {
                self.finalize(info);
                Ok(())
            }
            None => {
                let err = ProtocolError::CloseAckWithoutClose;
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    fn send_ack(&mut self) {
        let cumulative = self.inbound.processed_serial();
        self.forward(data_ack_header(cumulative));
        self.ack.mark_acked();
    }

    fn push_and_forward(&mut self, frame: Payload) {
        self.buffer.push(frame.clone());
        self.forward(frame);
    }

    /// Hand a frame to the transport, but only once the open step has run
    /// on the current connection. Unforwarded frames stay covered by the
    /// buffer and the next replay.
    fn forward(&mut self, frame: Payload) {
        if !self.wire_ready {
            return;
        }
        if let Err(err) = self.slot.send(frame) {
            self.note_transport_error(err);
        }
    }

    fn note_transport_error(&mut self, err: TransportError) {
        tracing::debug!(%err, "transport error recorded");
        self.pending_error = Some(LinkError::Transport(err));
    }

    /// Terminal transition. Emits the optional error event, the single
    /// close event, closes the transport, and leaves the engine inert.
    fn finalize(&mut self, info: CloseInfo) {
        self.close.cancel_guard();
        self.ack.mark_acked();
        self.state = ReadyState::Closed;
        self.wire_ready = false;

        if let Some(err) = self.pending_error.take() {
            self.events.push_back(Event::Error(err));
        }
        self.events.push_back(Event::Close {
            code: info.code,
            reason: info.reason.clone(),
        });

        self.slot.close(info.code, &info.reason);
        self.slot.detach();
    }

    fn fail(&mut self, err: ProtocolError) {
        tracing::warn!(%err, "fatal protocol violation; closing link");
        self.pending_error = Some(LinkError::Protocol(err));
        self.finalize(CloseInfo::abnormal());
    }
}
