//! Engine configuration.

use std::time::Duration;

use crate::core::constants::{
    DEFAULT_CLOSE_TIMEOUT, DEFAULT_MAX_UNACK_BYTES, DEFAULT_MAX_UNACK_MESSAGES,
    DEFAULT_MAX_UNACK_TIME, DEFAULT_RECONNECT_INTERVAL,
};

/// Tunables for a [`Retransmitter`](crate::link::Retransmitter).
#[derive(Debug, Clone)]
pub struct RetransmitterConfig {
    /// Acknowledge when cumulative inbound bytes since the last ack exceed
    /// this.
    pub max_unack_bytes: usize,

    /// Acknowledge when the inbound message count since the last ack
    /// exceeds this.
    pub max_unack_messages: usize,

    /// Acknowledge at latest this long after the first unacked inbound
    /// message.
    pub max_unack_time: Duration,

    /// Bound on waiting for a reconnect or a close acknowledgement.
    pub close_timeout: Duration,

    /// Delay between reconnect attempts when a transport factory drives
    /// the link.
    pub reconnect_interval: Duration,
}

impl Default for RetransmitterConfig {
    fn default() -> Self {
        Self {
            max_unack_bytes: DEFAULT_MAX_UNACK_BYTES,
            max_unack_messages: DEFAULT_MAX_UNACK_MESSAGES,
            max_unack_time: DEFAULT_MAX_UNACK_TIME,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }
}

impl RetransmitterConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> RetransmitterConfigBuilder {
        RetransmitterConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RetransmitterConfig`].
#[derive(Debug, Default)]
pub struct RetransmitterConfigBuilder {
    config: RetransmitterConfig,
}

impl RetransmitterConfigBuilder {
    /// Set the unacked-bytes ack threshold.
    pub fn max_unack_bytes(mut self, bytes: usize) -> Self {
        self.config.max_unack_bytes = bytes;
        self
    }

    /// Set the unacked-message-count ack threshold.
    pub fn max_unack_messages(mut self, messages: usize) -> Self {
        self.config.max_unack_messages = messages;
        self
    }

    /// Set the ack time bound.
    pub fn max_unack_time(mut self, time: Duration) -> Self {
        self.config.max_unack_time = time;
        self
    }

    /// Set the close guard timeout.
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.config.close_timeout = timeout;
        self
    }

    /// Set the reconnect delay.
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.config.reconnect_interval = interval;
        self
    }

    /// Finish building.
    pub fn build(self) -> RetransmitterConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RetransmitterConfig::default();
        assert_eq!(config.max_unack_bytes, 100_000);
        assert_eq!(config.max_unack_messages, 100);
        assert_eq!(config.max_unack_time, Duration::from_secs(10));
        assert_eq!(config.close_timeout, Duration::from_secs(60));
        assert_eq!(config.reconnect_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_builder_overrides() {
        let config = RetransmitterConfig::builder()
            .max_unack_bytes(1000)
            .max_unack_messages(3)
            .max_unack_time(Duration::from_millis(50))
            .close_timeout(Duration::from_secs(5))
            .reconnect_interval(Duration::from_millis(10))
            .build();

        assert_eq!(config.max_unack_bytes, 1000);
        assert_eq!(config.max_unack_messages, 3);
        assert_eq!(config.max_unack_time, Duration::from_millis(50));
        assert_eq!(config.close_timeout, Duration::from_secs(5));
        assert_eq!(config.reconnect_interval, Duration::from_millis(10));
    }
}
