//! Session tunables

use std::time::Duration;

/// Configuration for one protocol session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Deadline for each outbound call. The OCPP standard requires a
    /// per-call timeout but leaves the value open.
    pub call_timeout: Duration,

    /// WebSocket message size cap.
    pub max_message_size: usize,

    /// WebSocket frame size cap.
    pub max_frame_size: usize,

    /// Capacity of the outbound frame queue feeding the link task.
    pub outgoing_queue: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            max_message_size: 64 * 1024,
            max_frame_size: 16 * 1024,
            outgoing_queue: 64,
        }
    }
}

impl SessionConfig {
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = SessionConfig::default().with_call_timeout(Duration::from_secs(5));
        assert_eq!(config.call_timeout, Duration::from_secs(5));
        assert_eq!(config.outgoing_queue, 64);
    }
}
