//! Injected protocol observer
//!
//! The engine reports protocol-level events through a [`ProtocolObserver`]
//! instead of a process-wide logger. The default implementation forwards to
//! `tracing`; tests install a recording observer.

use crate::error::ErrorCode;

/// Hook points for one session's protocol events. All methods default to
/// no-ops so implementations pick what they care about.
pub trait ProtocolObserver: Send + Sync {
    /// Link established (dialed or attached).
    fn link_opened(&self, _endpoint: &str) {}

    /// Link gone; all pending calls have been cancelled.
    fn link_closed(&self, _reason: &str) {}

    fn call_sent(&self, _action: &str, _message_id: &str) {}

    fn call_received(&self, _action: &str, _message_id: &str) {}

    fn result_sent(&self, _message_id: &str) {}

    fn error_sent(&self, _message_id: &str, _code: ErrorCode) {}

    fn call_timed_out(&self, _message_id: &str) {}

    /// A CALLRESULT / CALLERROR arrived with no matching pending call.
    fn stray_reply(&self, _message_id: &str) {}

    /// An inbound frame was rejected at decode time.
    fn decode_rejected(&self, _description: &str) {}
}

/// Default observer: structured logs via `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ProtocolObserver for TracingObserver {
    fn link_opened(&self, endpoint: &str) {
        tracing::info!(endpoint, "link opened");
    }

    fn link_closed(&self, reason: &str) {
        tracing::info!(reason, "link closed");
    }

    fn call_sent(&self, action: &str, message_id: &str) {
        tracing::debug!(action, message_id, "CALL sent");
    }

    fn call_received(&self, action: &str, message_id: &str) {
        tracing::debug!(action, message_id, "CALL received");
    }

    fn result_sent(&self, message_id: &str) {
        tracing::debug!(message_id, "CALLRESULT sent");
    }

    fn error_sent(&self, message_id: &str, code: ErrorCode) {
        tracing::warn!(message_id, code = code.as_str(), "CALLERROR sent");
    }

    fn call_timed_out(&self, message_id: &str) {
        tracing::warn!(message_id, "call timed out");
    }

    fn stray_reply(&self, message_id: &str) {
        tracing::warn!(message_id, "dropping reply with no pending call");
    }

    fn decode_rejected(&self, description: &str) {
        tracing::warn!(description, "rejected inbound frame");
    }
}
