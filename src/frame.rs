//! OCPP-J envelope codec
//!
//! OCPP-J frames JSON-RPC-style arrays over WebSocket text messages:
//! - CALL: `[2, messageId, action, payload]`
//! - CALLRESULT: `[3, messageId, payload]`
//! - CALLERROR: `[4, messageId, errorCode, errorDescription, errorDetails]`
//!
//! Decoding a CALL consults the registry: for a known action the request
//! shape and validator run immediately. CALLRESULT / CALLERROR payloads stay
//! raw, since their shape is only known once the message id is matched
//! against the pending-call table; the dispatcher finishes decoding with
//! [`WireCodec::check_response`].

use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use crate::error::ErrorCode;
use crate::registry::{FeatureRegistry, PayloadFault};

/// Maximum length of a wire message id.
pub const MAX_MESSAGE_ID_LEN: usize = 36;

/// OCPP-J message type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Call = 2,
    CallResult = 3,
    CallError = 4,
}

/// CALL frame (request).
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub message_id: String,
    pub action: String,
    pub payload: Value,
}

/// CALLRESULT frame (success reply).
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    pub message_id: String,
    pub payload: Value,
}

/// CALLERROR frame (error reply).
#[derive(Debug, Clone, PartialEq)]
pub struct CallError {
    pub message_id: String,
    pub code: ErrorCode,
    pub description: String,
    pub details: Value,
}

impl CallError {
    pub fn new(message_id: impl Into<String>, code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            code,
            description: description.into(),
            details: Value::Object(serde_json::Map::new()),
        }
    }
}

/// A decoded envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Call(Call),
    CallResult(CallResult),
    CallError(CallError),
}

impl Frame {
    pub fn message_id(&self) -> &str {
        match self {
            Frame::Call(c) => &c.message_id,
            Frame::CallResult(r) => &r.message_id,
            Frame::CallError(e) => &e.message_id,
        }
    }
}

/// Decode-side fault. Carries the wire code to reply with; `message_id` is
/// present only when the frame was intact enough for the id to be trusted,
/// which is the precondition for sending a CALLERROR back.
#[derive(Debug, Clone, Error)]
#[error("{code}: {description}")]
pub struct WireFault {
    pub message_id: Option<String>,
    pub code: ErrorCode,
    pub description: String,
}

impl WireFault {
    fn formation(message_id: Option<String>, description: impl Into<String>) -> Self {
        Self {
            message_id,
            code: ErrorCode::FormationViolation,
            description: description.into(),
        }
    }
}

/// Envelope encoder/decoder bound to one feature registry.
#[derive(Clone)]
pub struct WireCodec {
    registry: Arc<FeatureRegistry>,
}

impl WireCodec {
    pub fn new(registry: Arc<FeatureRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<FeatureRegistry> {
        &self.registry
    }

    /// `[2, messageId, action, payload]`
    pub fn encode_call(&self, call: &Call) -> String {
        json!([
            MessageType::Call as i64,
            call.message_id,
            call.action,
            call.payload
        ])
        .to_string()
    }

    /// `[3, messageId, payload]`
    pub fn encode_result(&self, result: &CallResult) -> String {
        json!([
            MessageType::CallResult as i64,
            result.message_id,
            result.payload
        ])
        .to_string()
    }

    /// `[4, messageId, errorCode, errorDescription, errorDetails]`
    pub fn encode_error(&self, error: &CallError) -> String {
        json!([
            MessageType::CallError as i64,
            error.message_id,
            error.code.as_str(),
            error.description,
            error.details
        ])
        .to_string()
    }

    /// Decode one inbound text frame.
    pub fn decode(&self, text: &str) -> Result<Frame, WireFault> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| WireFault::formation(None, format!("malformed JSON: {}", e)))?;

        let items = root
            .as_array()
            .ok_or_else(|| WireFault::formation(None, "message is not a JSON array"))?;
        if items.is_empty() {
            return Err(WireFault::formation(None, "empty message array"));
        }

        let type_id = items[0]
            .as_i64()
            .ok_or_else(|| WireFault::formation(None, "message type id is not an integer"))?;

        let expected_len = match type_id {
            2 => 4,
            3 => 3,
            4 => 5,
            other => {
                return Err(WireFault::formation(
                    None,
                    format!("unknown message type id {}", other),
                ))
            }
        };
        if items.len() != expected_len {
            return Err(WireFault::formation(
                None,
                format!(
                    "message type {} requires {} elements, got {}",
                    type_id,
                    expected_len,
                    items.len()
                ),
            ));
        }

        let message_id = decode_message_id(&items[1])?;

        match type_id {
            2 => {
                let action = items[2].as_str().ok_or_else(|| {
                    WireFault::formation(Some(message_id.clone()), "action is not a string")
                })?;
                let payload = items[3].clone();

                // For a known action the request shape and validator run
                // here; unknown actions pass through for the dispatcher to
                // answer with NotImplemented.
                if let Some(descriptor) = self.registry.lookup(action) {
                    descriptor.request.check(&payload).map_err(|fault| {
                        payload_fault_to_wire(message_id.clone(), fault)
                    })?;
                }

                Ok(Frame::Call(Call {
                    message_id,
                    action: action.to_string(),
                    payload,
                }))
            }
            3 => Ok(Frame::CallResult(CallResult {
                message_id,
                payload: items[2].clone(),
            })),
            _ => {
                let code_str = items[2].as_str().ok_or_else(|| {
                    WireFault::formation(Some(message_id.clone()), "error code is not a string")
                })?;
                let code = serde_json::from_value(Value::String(code_str.to_string()))
                    .unwrap_or(ErrorCode::GenericError);
                let description = items[3].as_str().unwrap_or("").to_string();

                Ok(Frame::CallError(CallError {
                    message_id,
                    code,
                    description,
                    details: items[4].clone(),
                }))
            }
        }
    }

    /// Deferred payload check for a CALLRESULT, once the pending-call table
    /// has supplied the action it answers.
    pub fn check_response(&self, action: &str, payload: &Value) -> Result<(), PayloadFault> {
        match self.registry.lookup(action) {
            Some(descriptor) => descriptor.response.check(payload),
            None => Err(PayloadFault::Shape(format!("unknown action {}", action))),
        }
    }
}

fn decode_message_id(value: &Value) -> Result<String, WireFault> {
    let id = value
        .as_str()
        .ok_or_else(|| WireFault::formation(None, "message id is not a string"))?;
    if id.is_empty() {
        return Err(WireFault::formation(None, "message id is empty"));
    }
    if id.chars().count() > MAX_MESSAGE_ID_LEN {
        return Err(WireFault::formation(
            None,
            format!("message id exceeds {} characters", MAX_MESSAGE_ID_LEN),
        ));
    }
    Ok(id.to_string())
}

fn payload_fault_to_wire(message_id: String, fault: PayloadFault) -> WireFault {
    match fault {
        PayloadFault::Shape(msg) => WireFault {
            message_id: Some(message_id),
            code: ErrorCode::FormationViolation,
            description: msg,
        },
        PayloadFault::Constraints(violations) => WireFault {
            message_id: Some(message_id),
            code: ErrorCode::PropertyConstraintViolation,
            description: crate::validation::describe(&violations),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ProtocolVersion;

    fn codec() -> WireCodec {
        WireCodec::new(Arc::new(FeatureRegistry::new(ProtocolVersion::V16)))
    }

    #[test]
    fn call_roundtrip() {
        let codec = codec();
        let call = Call {
            message_id: "m-1".into(),
            action: "Heartbeat".into(),
            payload: json!({}),
        };
        let text = codec.encode_call(&call);
        assert!(text.starts_with("[2,"));
        assert_eq!(codec.decode(&text).unwrap(), Frame::Call(call));
    }

    #[test]
    fn result_roundtrip() {
        let codec = codec();
        let result = CallResult {
            message_id: "m-1".into(),
            payload: json!({"currentTime": "2026-01-20T12:00:00Z"}),
        };
        let text = codec.encode_result(&result);
        assert_eq!(codec.decode(&text).unwrap(), Frame::CallResult(result));
    }

    #[test]
    fn error_roundtrip() {
        let codec = codec();
        let error = CallError {
            message_id: "m-1".into(),
            code: ErrorCode::NotImplemented,
            description: "no such action".into(),
            details: json!({}),
        };
        let text = codec.encode_error(&error);
        assert_eq!(codec.decode(&text).unwrap(), Frame::CallError(error));
    }

    #[test]
    fn unknown_error_code_becomes_generic() {
        let codec = codec();
        let frame = codec
            .decode(r#"[4, "m-1", "SomethingNew", "oops", {}]"#)
            .unwrap();
        match frame {
            Frame::CallError(e) => assert_eq!(e.code, ErrorCode::GenericError),
            other => panic!("expected CallError, got {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_type_id() {
        let codec = codec();
        let fault = codec.decode(r#"[7, "m-1", {}]"#).unwrap_err();
        assert_eq!(fault.code, ErrorCode::FormationViolation);
        assert!(fault.message_id.is_none());
    }

    #[test]
    fn rejects_wrong_arity() {
        let codec = codec();
        assert!(codec.decode(r#"[2, "m-1", "Reset"]"#).is_err());
        assert!(codec.decode(r#"[3, "m-1"]"#).is_err());
        assert!(codec.decode(r#"[4, "m-1", "GenericError", "x"]"#).is_err());
    }

    #[test]
    fn rejects_bad_message_id() {
        let codec = codec();
        assert!(codec.decode(r#"[3, "", {}]"#).is_err());
        assert!(codec.decode(r#"[3, 42, {}]"#).is_err());
        let long = "x".repeat(MAX_MESSAGE_ID_LEN + 1);
        assert!(codec
            .decode(&format!(r#"[3, "{}", {{}}]"#, long))
            .is_err());
    }

    #[test]
    fn rejects_non_array() {
        let codec = codec();
        assert!(codec.decode(r#"{"not": "an array"}"#).is_err());
        assert!(codec.decode("not json at all").is_err());
    }
}
