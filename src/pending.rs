//! Pending-call table
//!
//! Tracks the one outbound CALL awaiting its CALLRESULT / CALLERROR. OCPP
//! allows a single outstanding request per endpoint, so the table is a
//! single slot; a second `add` while occupied is the caller's `Busy`.
//!
//! Each entry owns a one-shot completion sink. The sink resolves exactly
//! once: on a matching reply, on timeout, or when the session tears down.

use std::time::Instant;

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::CallFailure;

pub type CallOutcome = Result<Value, CallFailure>;

/// One outstanding CALL.
#[derive(Debug)]
pub struct PendingCall {
    message_id: String,
    action: &'static str,
    issued_at: Instant,
    sink: oneshot::Sender<CallOutcome>,
}

impl PendingCall {
    pub fn new(
        message_id: String,
        action: &'static str,
        sink: oneshot::Sender<CallOutcome>,
    ) -> Self {
        Self {
            message_id,
            action,
            issued_at: Instant::now(),
            sink,
        }
    }

    pub fn age(&self) -> std::time::Duration {
        self.issued_at.elapsed()
    }
}

/// The per-session table. Holds at most one entry.
#[derive(Debug, Default)]
pub struct PendingCalls {
    slot: Option<PendingCall>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a call. Fails when another call is still in flight.
    pub fn add(&mut self, call: PendingCall) -> Result<(), CallFailure> {
        if self.slot.is_some() {
            return Err(CallFailure::Busy);
        }
        self.slot = Some(call);
        Ok(())
    }

    /// Action recorded for a message id, used to finish decoding a reply.
    pub fn action_of(&self, message_id: &str) -> Option<&'static str> {
        self.slot
            .as_ref()
            .filter(|p| p.message_id == message_id)
            .map(|p| p.action)
    }

    /// Delivers a successful payload into the matching sink. Returns false
    /// when no entry matches (stray reply; the caller drops the frame).
    pub fn resolve(&mut self, message_id: &str, payload: Value) -> bool {
        self.complete(message_id, Ok(payload))
    }

    /// Delivers a failure into the matching sink.
    pub fn fail(&mut self, message_id: &str, failure: CallFailure) -> bool {
        self.complete(message_id, Err(failure))
    }

    /// Drains the table, failing the remaining entry with the given reason.
    /// Runs on disconnect and on `stop()`.
    pub fn cancel_all(&mut self, failure: CallFailure) {
        if let Some(entry) = self.slot.take() {
            let _ = entry.sink.send(Err(failure));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    fn complete(&mut self, message_id: &str, outcome: CallOutcome) -> bool {
        let matched = self
            .slot
            .as_ref()
            .is_some_and(|entry| entry.message_id == message_id);
        if !matched {
            return false;
        }
        if let Some(entry) = self.slot.take() {
            // The receiver may already be gone (caller gave up); that is
            // not this table's concern.
            let _ = entry.sink.send(outcome);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str) -> (PendingCall, oneshot::Receiver<CallOutcome>) {
        let (tx, rx) = oneshot::channel();
        (PendingCall::new(id.to_string(), "Heartbeat", tx), rx)
    }

    #[test]
    fn second_add_is_busy() {
        let mut table = PendingCalls::new();
        let (first, _rx1) = entry("m-1");
        let (second, _rx2) = entry("m-2");

        table.add(first).unwrap();
        assert!(matches!(table.add(second), Err(CallFailure::Busy)));
    }

    #[test]
    fn resolve_delivers_and_empties() {
        let mut table = PendingCalls::new();
        let (call, mut rx) = entry("m-1");
        table.add(call).unwrap();

        assert_eq!(table.action_of("m-1"), Some("Heartbeat"));
        assert!(table.resolve("m-1", json!({"ok": true})));
        assert!(table.is_empty());
        assert!(matches!(rx.try_recv(), Ok(Ok(_))));
    }

    #[test]
    fn mismatched_id_is_ignored() {
        let mut table = PendingCalls::new();
        let (call, mut rx) = entry("m-1");
        table.add(call).unwrap();

        assert!(!table.resolve("m-other", json!({})));
        assert!(!table.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn cancel_all_fails_the_entry() {
        let mut table = PendingCalls::new();
        let (call, mut rx) = entry("m-1");
        table.add(call).unwrap();

        table.cancel_all(CallFailure::SessionClosed);
        assert!(table.is_empty());
        assert!(matches!(rx.try_recv(), Ok(Err(CallFailure::SessionClosed))));
    }
}
