//! Batched acknowledgement scheduling.
//!
//! Acknowledgements are coalesced until one of three bounds is crossed:
//! accumulated bytes, accumulated message count, or elapsed time since the
//! first unacked inbound message. The time bound is a single deadline,
//! armed at most once per accumulation run.

use std::time::{Duration, Instant};

/// Decides when the receive side owes the peer a cumulative ack.
#[derive(Debug)]
pub struct AckSchedule {
    max_unack_bytes: usize,
    max_unack_messages: usize,
    max_unack_time: Duration,

    unack_bytes: usize,
    unack_count: usize,
    deadline: Option<Instant>,
}

impl AckSchedule {
    /// Create a schedule with the given bounds.
    pub fn new(max_unack_bytes: usize, max_unack_messages: usize, max_unack_time: Duration) -> Self {
        Self {
            max_unack_bytes,
            max_unack_messages,
            max_unack_time,
            unack_bytes: 0,
            unack_count: 0,
            deadline: None,
        }
    }

    /// Account for one completed inbound data message.
    ///
    /// Arms the time deadline first (when `may_arm` and not already armed),
    /// then reports whether a threshold now demands an immediate ack, so a
    /// threshold crossing and a deadline landing in the same step produce
    /// exactly one ack.
    pub fn on_data(&mut self, size: usize, now: Instant, may_arm: bool) -> bool {
        self.unack_bytes += size;
        self.unack_count += 1;

        if may_arm && self.deadline.is_none() {
            self.deadline = Some(now + self.max_unack_time);
        }

        self.unack_bytes > self.max_unack_bytes || self.unack_count > self.max_unack_messages
    }

    /// The armed deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the armed deadline has elapsed.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Reset both accumulators and disarm the deadline. Called whenever an
    /// ack goes out, whichever of the three triggers produced it.
    pub fn mark_acked(&mut self) {
        self.unack_bytes = 0;
        self.unack_count = 0;
        self.deadline = None;
    }

    /// Accumulated unacked bytes since the last ack.
    pub fn unack_bytes(&self) -> usize {
        self.unack_bytes
    }

    /// Accumulated unacked messages since the last ack.
    pub fn unack_count(&self) -> usize {
        self.unack_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(bytes: usize, messages: usize) -> AckSchedule {
        AckSchedule::new(bytes, messages, Duration::from_secs(10))
    }

    #[test]
    fn test_byte_threshold() {
        let mut ack = schedule(1000, 100);
        let now = Instant::now();

        assert!(!ack.on_data(400, now, true));
        assert!(!ack.on_data(400, now, true));
        assert!(ack.on_data(400, now, true));
    }

    #[test]
    fn test_count_threshold() {
        let mut ack = schedule(usize::MAX, 2);
        let now = Instant::now();

        assert!(!ack.on_data(1, now, true));
        assert!(!ack.on_data(1, now, true));
        assert!(ack.on_data(1, now, true));
    }

    #[test]
    fn test_deadline_armed_once() {
        let mut ack = schedule(1000, 100);
        let start = Instant::now();

        ack.on_data(1, start, true);
        let armed = ack.deadline().unwrap();
        assert_eq!(armed, start + Duration::from_secs(10));

        // Later messages do not push the deadline out.
        ack.on_data(1, start + Duration::from_secs(5), true);
        assert_eq!(ack.deadline().unwrap(), armed);
    }

    #[test]
    fn test_deadline_not_armed_when_disallowed() {
        let mut ack = schedule(1000, 100);
        ack.on_data(1, Instant::now(), false);
        assert!(ack.deadline().is_none());
    }

    #[test]
    fn test_is_due() {
        let mut ack = schedule(1000, 100);
        let start = Instant::now();

        assert!(!ack.is_due(start));
        ack.on_data(1, start, true);
        assert!(!ack.is_due(start));
        assert!(ack.is_due(start + Duration::from_secs(10)));
        assert!(ack.is_due(start + Duration::from_secs(11)));
    }

    #[test]
    fn test_mark_acked_resets_everything() {
        let mut ack = schedule(1000, 100);
        let start = Instant::now();

        ack.on_data(500, start, true);
        ack.mark_acked();

        assert_eq!(ack.unack_bytes(), 0);
        assert_eq!(ack.unack_count(), 0);
        assert!(ack.deadline().is_none());

        // The run restarts cleanly.
        assert!(!ack.on_data(600, start, true));
        assert!(ack.on_data(600, start, true));
    }
}
