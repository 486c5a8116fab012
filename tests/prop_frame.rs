//! Property tests for the OCPP-J envelope codec
//!
//! Invariants exercised:
//! - decode(encode(frame)) == frame for all three envelope shapes
//! - every registered feature's request/response sample survives a
//!   wire round-trip unchanged
//! - malformed envelopes (bad type id, wrong arity, bad message id) are
//!   rejected, never misparsed

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value};

use ocppj::frame::{Call, CallError, CallResult, Frame, WireCodec, MAX_MESSAGE_ID_LEN};
use ocppj::registry::FeatureRegistry;
use ocppj::{ErrorCode, ProtocolVersion};

fn bare_codec() -> WireCodec {
    WireCodec::new(Arc::new(FeatureRegistry::new(ProtocolVersion::V16)))
}

fn v16_codec() -> WireCodec {
    WireCodec::new(Arc::new(ocppj::v16::registry()))
}

// ============================================================================
// Strategies
// ============================================================================

fn message_id() -> impl Strategy<Value = String> {
    "[A-Za-z0-9-]{1,36}"
}

fn action_name() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z]{0,29}"
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::from),
    ]
}

fn payload_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z][a-zA-Z0-9]{0,10}", scalar(), 0..5).prop_map(|map| {
        Value::Object(map.into_iter().collect())
    })
}

fn error_code() -> impl Strategy<Value = ErrorCode> {
    prop_oneof![
        Just(ErrorCode::NotImplemented),
        Just(ErrorCode::NotSupported),
        Just(ErrorCode::InternalError),
        Just(ErrorCode::ProtocolError),
        Just(ErrorCode::SecurityError),
        Just(ErrorCode::FormationViolation),
        Just(ErrorCode::PropertyConstraintViolation),
        Just(ErrorCode::OccurrenceConstraintViolation),
        Just(ErrorCode::TypeConstraintViolation),
        Just(ErrorCode::GenericError),
    ]
}

// ============================================================================
// Round-trips
// ============================================================================

proptest! {
    #[test]
    fn call_roundtrips(id in message_id(), action in action_name(), payload in payload_object()) {
        let codec = bare_codec();
        let call = Call { message_id: id, action, payload };
        let decoded = codec.decode(&codec.encode_call(&call)).unwrap();
        prop_assert_eq!(decoded, Frame::Call(call));
    }

    #[test]
    fn result_roundtrips(id in message_id(), payload in payload_object()) {
        let codec = bare_codec();
        let result = CallResult { message_id: id, payload };
        let decoded = codec.decode(&codec.encode_result(&result)).unwrap();
        prop_assert_eq!(decoded, Frame::CallResult(result));
    }

    #[test]
    fn error_roundtrips(
        id in message_id(),
        code in error_code(),
        description in "[a-zA-Z0-9 ]{0,40}",
        details in payload_object(),
    ) {
        let codec = bare_codec();
        let error = CallError { message_id: id, code, description, details };
        let decoded = codec.decode(&codec.encode_error(&error)).unwrap();
        prop_assert_eq!(decoded, Frame::CallError(error));
    }

    #[test]
    fn unknown_type_ids_are_rejected(type_id in any::<i64>(), id in message_id()) {
        prop_assume!(!(2..=4).contains(&type_id));
        let codec = bare_codec();
        let fault = codec
            .decode(&format!(r#"[{}, "{}", {{}}]"#, type_id, id))
            .unwrap_err();
        prop_assert_eq!(fault.code, ErrorCode::FormationViolation);
    }

    #[test]
    fn oversized_message_ids_are_rejected(extra in 1usize..20) {
        let codec = bare_codec();
        let id = "x".repeat(MAX_MESSAGE_ID_LEN + extra);
        let result = codec.decode(&format!(r#"[3, "{}", {{}}]"#, id));
        prop_assert!(result.is_err());
    }

    #[test]
    fn truncated_calls_are_rejected(id in message_id(), action in action_name()) {
        let codec = bare_codec();
        let result = codec.decode(&format!(r#"[2, "{}", "{}"]"#, id, action));
        prop_assert!(result.is_err());
    }
}

// ============================================================================
// Per-feature round-trips
// ============================================================================

/// Sample request/response payloads for every 1.6 feature in the registry.
fn v16_samples() -> Vec<(&'static str, Value, Value)> {
    let now = "2026-01-20T12:00:00Z";
    vec![
        (
            "Authorize",
            json!({"idTag": "TOKEN123"}),
            json!({"idTagInfo": {"status": "Accepted"}}),
        ),
        (
            "BootNotification",
            json!({"chargePointVendor": "Elektrokombinacija", "chargePointModel": "EK3-OCPP"}),
            json!({"currentTime": now, "interval": 300, "status": "Accepted"}),
        ),
        (
            "CancelReservation",
            json!({"reservationId": 7}),
            json!({"status": "Accepted"}),
        ),
        (
            "ChangeAvailability",
            json!({"connectorId": 1, "type": "Operative"}),
            json!({"status": "Scheduled"}),
        ),
        (
            "ChangeConfiguration",
            json!({"key": "HeartbeatInterval", "value": "300"}),
            json!({"status": "Accepted"}),
        ),
        ("ClearCache", json!({}), json!({"status": "Accepted"})),
        (
            "ClearChargingProfile",
            json!({"connectorId": 1}),
            json!({"status": "Accepted"}),
        ),
        (
            "DataTransfer",
            json!({"vendorId": "org.example", "messageId": "Diag"}),
            json!({"status": "Accepted"}),
        ),
        (
            "GetCompositeSchedule",
            json!({"connectorId": 1, "duration": 3600}),
            json!({"status": "Accepted", "connectorId": 1}),
        ),
        (
            "GetConfiguration",
            json!({"key": ["HeartbeatInterval"]}),
            json!({"configurationKey": [{"key": "HeartbeatInterval", "readonly": false, "value": "300"}]}),
        ),
        ("Heartbeat", json!({}), json!({"currentTime": now})),
        (
            "MeterValues",
            json!({"connectorId": 1, "meterValue": [{"timestamp": now, "sampledValue": [{"value": "4200"}]}]}),
            json!({}),
        ),
        (
            "RemoteStartTransaction",
            json!({"idTag": "TOKEN123", "connectorId": 1}),
            json!({"status": "Accepted"}),
        ),
        (
            "RemoteStopTransaction",
            json!({"transactionId": 42}),
            json!({"status": "Accepted"}),
        ),
        ("Reset", json!({"type": "Soft"}), json!({"status": "Accepted"})),
        (
            "ReserveNow",
            json!({"connectorId": 1, "expiryDate": now, "idTag": "TOKEN123", "reservationId": 7}),
            json!({"status": "Accepted"}),
        ),
        (
            "SetChargingProfile",
            json!({
                "connectorId": 1,
                "csChargingProfiles": {
                    "chargingProfileId": 1,
                    "stackLevel": 0,
                    "chargingProfilePurpose": "TxDefaultProfile",
                    "chargingProfileKind": "Absolute",
                    "chargingSchedule": {
                        "chargingRateUnit": "W",
                        "chargingSchedulePeriod": [{"startPeriod": 0, "limit": 22000.0}]
                    }
                }
            }),
            json!({"status": "Accepted"}),
        ),
        (
            "StartTransaction",
            json!({"connectorId": 1, "idTag": "TOKEN123", "meterStart": 0, "timestamp": now}),
            json!({"idTagInfo": {"status": "Accepted"}, "transactionId": 42}),
        ),
        (
            "StatusNotification",
            json!({"connectorId": 1, "errorCode": "NoError", "status": "Available"}),
            json!({}),
        ),
        (
            "StopTransaction",
            json!({"meterStop": 4200, "timestamp": now, "transactionId": 42}),
            json!({}),
        ),
        (
            "UnlockConnector",
            json!({"connectorId": 1}),
            json!({"status": "Unlocked"}),
        ),
    ]
}

#[test]
fn every_v16_feature_has_a_sample() {
    let registry = ocppj::v16::registry();
    let samples = v16_samples();
    let mut covered: Vec<&str> = samples.iter().map(|(action, _, _)| *action).collect();
    covered.sort_unstable();

    let mut actions: Vec<&str> = registry.actions().collect();
    actions.sort_unstable();
    assert_eq!(actions, covered);
}

#[test]
fn v16_feature_payloads_roundtrip_and_validate() {
    let codec = v16_codec();
    let registry = ocppj::v16::registry();

    for (action, request, response) in v16_samples() {
        let descriptor = registry.lookup(action).unwrap();
        descriptor
            .request
            .check(&request)
            .unwrap_or_else(|fault| panic!("{} request sample rejected: {}", action, fault));
        descriptor
            .response
            .check(&response)
            .unwrap_or_else(|fault| panic!("{} response sample rejected: {}", action, fault));

        let call = Call {
            message_id: format!("m-{}", action),
            action: action.to_string(),
            payload: request,
        };
        let decoded = codec.decode(&codec.encode_call(&call)).unwrap();
        assert_eq!(decoded, Frame::Call(call));

        let result = CallResult {
            message_id: format!("m-{}", action),
            payload: response,
        };
        let decoded = codec.decode(&codec.encode_result(&result)).unwrap();
        assert_eq!(decoded, Frame::CallResult(result));
    }
}

#[test]
fn known_call_with_bad_shape_is_a_formation_violation() {
    let codec = v16_codec();
    let fault = codec
        .decode(r#"[2, "m-1", "RemoteStopTransaction", {"transactionId": "not a number"}]"#)
        .unwrap_err();
    assert_eq!(fault.code, ErrorCode::FormationViolation);
    assert_eq!(fault.message_id.as_deref(), Some("m-1"));
}

#[test]
fn known_call_with_bad_constraint_is_a_property_violation() {
    let codec = v16_codec();
    let fault = codec
        .decode(r#"[2, "m-1", "RemoteStopTransaction", {"transactionId": -5}]"#)
        .unwrap_err();
    assert_eq!(fault.code, ErrorCode::PropertyConstraintViolation);
    assert_eq!(fault.message_id.as_deref(), Some("m-1"));
}

#[test]
fn unknown_action_still_decodes() {
    // The dispatcher answers NotImplemented; the codec must not reject it.
    let codec = v16_codec();
    let frame = codec
        .decode(r#"[2, "m-2", "DoTheHokeyPokey", {}]"#)
        .unwrap();
    match frame {
        Frame::Call(call) => assert_eq!(call.action, "DoTheHokeyPokey"),
        other => panic!("expected Call, got {:?}", other),
    }
}
