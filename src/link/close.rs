//! Close handshake state.
//!
//! Tracks the descriptor a local `close()` promised the application, the
//! tri-state acknowledgement (no close attempted / awaiting CLOSE_ACK /
//! acknowledged), and the guard deadline bounding how long the link waits
//! for a reconnect or the peer's CLOSE_ACK.

use std::time::{Duration, Instant};

use crate::core::traits::CloseInfo;

/// State of the two-phase close handshake and its guard timer.
#[derive(Debug)]
pub struct CloseHandshake {
    timeout: Duration,
    pending: Option<CloseInfo>,
    acknowledged: Option<bool>,
    deadline: Option<Instant>,
}

impl CloseHandshake {
    /// Create handshake state with the given guard timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            pending: None,
            acknowledged: None,
            deadline: None,
        }
    }

    /// Record a locally initiated close and arm the guard.
    pub fn begin_local(&mut self, info: CloseInfo, now: Instant) {
        self.pending = Some(info);
        self.acknowledged = Some(false);
        self.arm(now);
    }

    /// Whether a local close is waiting for the peer's CLOSE_ACK.
    pub fn is_awaiting_ack(&self) -> bool {
        self.acknowledged == Some(false)
    }

    /// Complete the handshake, yielding the promised descriptor.
    ///
    /// Returns `None` when no close is in flight (a CLOSE_ACK then means
    /// the peer has desynced).
    pub fn acknowledge(&mut self) -> Option<CloseInfo> {
        if self.is_awaiting_ack() {
            self.acknowledged = Some(true);
            self.pending.take()
        } else {
            None
        }
    }

    /// Arm the guard if it is not already running. An armed guard keeps its
    /// original deadline.
    pub fn arm(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.timeout);
        }
    }

    /// Disarm the guard.
    pub fn cancel_guard(&mut self) {
        self.deadline = None;
    }

    /// The guard deadline, if armed.
    pub fn guard_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the armed guard has elapsed.
    pub fn guard_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Take the pending descriptor without completing the handshake (guard
    /// expiry path).
    pub fn take_pending(&mut self) -> Option<CloseInfo> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handshake() -> CloseHandshake {
        CloseHandshake::new(Duration::from_secs(60))
    }

    #[test]
    fn test_local_close_arms_guard() {
        let mut close = handshake();
        let start = Instant::now();

        assert!(!close.is_awaiting_ack());
        close.begin_local(CloseInfo::new(1234, "bye"), start);

        assert!(close.is_awaiting_ack());
        assert_eq!(close.guard_deadline(), Some(start + Duration::from_secs(60)));
    }

    #[test]
    fn test_acknowledge_yields_descriptor_once() {
        let mut close = handshake();
        close.begin_local(CloseInfo::new(1234, "bye"), Instant::now());

        let info = close.acknowledge().unwrap();
        assert_eq!(info.code, 1234);
        assert_eq!(info.reason, "bye");

        assert!(!close.is_awaiting_ack());
        assert!(close.acknowledge().is_none());
    }

    #[test]
    fn test_acknowledge_without_close_is_none() {
        let mut close = handshake();
        assert!(close.acknowledge().is_none());
    }

    #[test]
    fn test_arm_keeps_existing_deadline() {
        let mut close = handshake();
        let start = Instant::now();

        close.arm(start);
        let first = close.guard_deadline().unwrap();

        close.arm(start + Duration::from_secs(30));
        assert_eq!(close.guard_deadline().unwrap(), first);
    }

    #[test]
    fn test_guard_due_and_cancel() {
        let mut close = handshake();
        let start = Instant::now();

        close.arm(start);
        assert!(!close.guard_due(start));
        assert!(close.guard_due(start + Duration::from_secs(60)));

        close.cancel_guard();
        assert!(!close.guard_due(start + Duration::from_secs(120)));
    }

    #[test]
    fn test_take_pending_on_guard_expiry() {
        let mut close = handshake();
        close.begin_local(CloseInfo::new(1234, "bye"), Instant::now());

        let info = close.take_pending().unwrap();
        assert_eq!(info.code, 1234);
        assert!(close.take_pending().is_none());
    }
}
