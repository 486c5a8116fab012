//! Error taxonomy for the OCPP-J runtime
//!
//! Three layers of failure exist and stay separate:
//! - wire-level CALLERROR codes ([`ErrorCode`]), serialized verbatim,
//! - failures of an outbound call, returned to the caller ([`CallFailure`]),
//! - structured errors a handler raises for an inbound call
//!   ([`HandlerFault`]), which become CALLERROR frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// OCPP-J CALLERROR codes, as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    NotImplemented,
    NotSupported,
    InternalError,
    ProtocolError,
    SecurityError,
    FormationViolation,
    PropertyConstraintViolation,
    OccurrenceConstraintViolation,
    TypeConstraintViolation,
    GenericError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotImplemented => "NotImplemented",
            ErrorCode::NotSupported => "NotSupported",
            ErrorCode::InternalError => "InternalError",
            ErrorCode::ProtocolError => "ProtocolError",
            ErrorCode::SecurityError => "SecurityError",
            ErrorCode::FormationViolation => "FormationViolation",
            ErrorCode::PropertyConstraintViolation => "PropertyConstraintViolation",
            ErrorCode::OccurrenceConstraintViolation => "OccurrenceConstraintViolation",
            ErrorCode::TypeConstraintViolation => "TypeConstraintViolation",
            ErrorCode::GenericError => "GenericError",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors on the transport link. Terminal for the session; the engine does
/// not reconnect.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("websocket handshake rejected: {0}")]
    Handshake(String),

    #[error("invalid endpoint url: {0}")]
    BadUrl(String),

    #[error("link closed")]
    Closed,

    #[error("session already started")]
    AlreadyOpen,
}

/// Failure of an outbound call, returned to the caller of
/// [`crate::session::Session::call`]. Never torn down into the session;
/// retry is a caller concern.
#[derive(Debug, Error)]
pub enum CallFailure {
    /// Another call is still awaiting its reply (single-in-flight rule).
    #[error("another call is already in flight")]
    Busy,

    /// The action is not registered on this session, or its direction
    /// forbids this endpoint from sending it.
    #[error("feature {0} is unsupported on this endpoint, cannot send request")]
    FeatureNotSupported(String),

    /// The session is not open. Also the outcome of calls pending at the
    /// moment the transport was lost or `stop()` ran.
    #[error("session closed")]
    SessionClosed,

    /// No reply arrived before the per-call deadline.
    #[error("timed out waiting for response")]
    Timeout,

    /// The peer answered with a CALLERROR.
    #[error("peer replied {code}: {description}")]
    Peer {
        code: ErrorCode,
        description: String,
        details: Value,
    },

    /// The reply arrived but its payload failed the response shape check.
    #[error("response payload rejected: {0}")]
    Payload(String),

    /// No open session exists for the addressed station (CSMS facade).
    #[error("no open session for station {0}")]
    UnknownStation(String),

    /// The request value could not be serialized.
    #[error("request payload could not be encoded: {0}")]
    Encode(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Structured error returned by an inbound-call handler. The dispatcher
/// turns it into a CALLERROR frame with the given code.
#[derive(Debug, Clone)]
pub struct HandlerFault {
    pub code: ErrorCode,
    pub description: String,
    pub details: Value,
}

impl HandlerFault {
    pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn internal(description: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, description)
    }

    pub fn not_supported(description: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotSupported, description)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

impl std::fmt::Display for HandlerFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

impl std::error::Error for HandlerFault {}

/// A feature registration collided with an existing descriptor of a
/// different shape.
#[derive(Debug, Error)]
#[error("feature {action} is already registered with a different descriptor")]
pub struct RegistryConflict {
    pub action: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_verbatim() {
        let json = serde_json::to_string(&ErrorCode::FormationViolation).unwrap();
        assert_eq!(json, "\"FormationViolation\"");

        let code: ErrorCode = serde_json::from_str("\"NotImplemented\"").unwrap();
        assert_eq!(code, ErrorCode::NotImplemented);
    }

    #[test]
    fn display_matches_wire_string() {
        assert_eq!(
            ErrorCode::PropertyConstraintViolation.to_string(),
            "PropertyConstraintViolation"
        );
    }
}
