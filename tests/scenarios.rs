//! End-to-end dispatch scenarios over in-memory links
//!
//! Covers the full request/reply lifecycle of both facades without touching
//! a socket: happy-path correlation, unknown actions, unbound handlers, the
//! single-in-flight rule, timeouts with late replies, and reconnect
//! semantics.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use ocppj::error::{CallFailure, HandlerFault};
use ocppj::transport::{memory_link_pair, MemoryConnector, MemoryLink, MessageLink};
use ocppj::v16::types::*;
use ocppj::v16::{
    CentralSystem, ChargePoint, ChargePointCoreHandler,
};
use ocppj::{ErrorCode, SessionConfig};

// ============================================================================
// Harness
// ============================================================================

/// Station-side Core handler with a configurable delay on RemoteStart, so
/// tests can hold a call in flight.
#[derive(Default)]
struct StationCore {
    remote_stops: Mutex<Vec<i32>>,
    start_delay: Option<Duration>,
}

#[async_trait]
impl ChargePointCoreHandler for StationCore {
    async fn on_change_availability(
        &self,
        _request: ChangeAvailabilityRequest,
    ) -> Result<ChangeAvailabilityConfirmation, HandlerFault> {
        Ok(ChangeAvailabilityConfirmation {
            status: AvailabilityStatus::Accepted,
        })
    }

    async fn on_change_configuration(
        &self,
        _request: ChangeConfigurationRequest,
    ) -> Result<ChangeConfigurationConfirmation, HandlerFault> {
        Ok(ChangeConfigurationConfirmation {
            status: ConfigurationStatus::Accepted,
        })
    }

    async fn on_clear_cache(
        &self,
        _request: ClearCacheRequest,
    ) -> Result<ClearCacheConfirmation, HandlerFault> {
        Ok(ClearCacheConfirmation {
            status: ClearCacheStatus::Accepted,
        })
    }

    async fn on_data_transfer(
        &self,
        _request: DataTransferRequest,
    ) -> Result<DataTransferConfirmation, HandlerFault> {
        Ok(DataTransferConfirmation {
            status: DataTransferStatus::Accepted,
            data: None,
        })
    }

    async fn on_get_configuration(
        &self,
        _request: GetConfigurationRequest,
    ) -> Result<GetConfigurationConfirmation, HandlerFault> {
        Ok(GetConfigurationConfirmation::default())
    }

    async fn on_remote_start_transaction(
        &self,
        _request: RemoteStartTransactionRequest,
    ) -> Result<RemoteStartTransactionConfirmation, HandlerFault> {
        if let Some(delay) = self.start_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(RemoteStartTransactionConfirmation {
            status: RemoteStartStopStatus::Accepted,
        })
    }

    async fn on_remote_stop_transaction(
        &self,
        request: RemoteStopTransactionRequest,
    ) -> Result<RemoteStopTransactionConfirmation, HandlerFault> {
        if let Ok(mut stops) = self.remote_stops.lock() {
            stops.push(request.transaction_id);
        }
        Ok(RemoteStopTransactionConfirmation {
            status: RemoteStartStopStatus::Accepted,
        })
    }

    async fn on_reset(&self, _request: ResetRequest) -> Result<ResetConfirmation, HandlerFault> {
        Ok(ResetConfirmation {
            status: ResetStatus::Accepted,
        })
    }

    async fn on_unlock_connector(
        &self,
        _request: UnlockConnectorRequest,
    ) -> Result<UnlockConnectorConfirmation, HandlerFault> {
        Ok(UnlockConnectorConfirmation {
            status: UnlockStatus::Unlocked,
        })
    }
}

/// Charge point and central system wired through one in-memory link.
async fn facade_pair(
    handler: Option<Arc<StationCore>>,
) -> (ChargePoint, CentralSystem) {
    let (near, far) = memory_link_pair();
    let connector = MemoryConnector::new();
    connector.provide(near);

    let charge_point =
        ChargePoint::with_connector("CS001", Box::new(connector), SessionConfig::default());
    if let Some(handler) = handler {
        charge_point.set_core_handler(handler);
    }

    let central_system = CentralSystem::new();
    central_system
        .attach_station("CS001", Box::new(far))
        .unwrap();

    charge_point
        .start("ws://csms.example/ocpp")
        .await
        .unwrap();

    (charge_point, central_system)
}

/// Charge point whose peer is a raw link the test drives by hand. Stages
/// one link per expected `start`.
fn raw_pair(config: SessionConfig, starts: usize) -> (ChargePoint, Vec<MemoryLink>) {
    let connector = MemoryConnector::new();
    let mut fars = Vec::new();
    for _ in 0..starts {
        let (near, far) = memory_link_pair();
        connector.provide(near);
        fars.push(far);
    }
    (
        ChargePoint::with_connector("EK3-001", Box::new(connector), config),
        fars,
    )
}

async fn read_frame(far: &mut MemoryLink) -> Vec<Value> {
    let text = far.recv().await.expect("link open").expect("clean frame");
    serde_json::from_str(&text).expect("valid JSON array")
}

// ============================================================================
// Remote stop, happy path
// ============================================================================

#[tokio::test]
async fn remote_stop_happy_path() {
    let handler = Arc::new(StationCore::default());
    let (_charge_point, central_system) = facade_pair(Some(handler.clone())).await;

    let confirmation = central_system
        .remote_stop_transaction("CS001", 42)
        .await
        .unwrap();

    assert_eq!(confirmation.status, RemoteStartStopStatus::Accepted);
    assert_eq!(*handler.remote_stops.lock().unwrap(), vec![42]);
}

// ============================================================================
// Unknown action
// ============================================================================

#[tokio::test]
async fn unknown_action_gets_not_implemented() {
    let (charge_point, mut fars) = raw_pair(SessionConfig::default(), 1);
    charge_point.start("ws://csms.example/ocpp").await.unwrap();
    let mut far = fars.remove(0);

    far.send(r#"[2,"m2","DoTheHokeyPokey",{}]"#.to_string())
        .await
        .unwrap();

    let reply = read_frame(&mut far).await;
    assert_eq!(reply[0], json!(4));
    assert_eq!(reply[1], json!("m2"));
    assert_eq!(reply[2], json!("NotImplemented"));
}

// ============================================================================
// Handler unbound
// ============================================================================

#[tokio::test]
async fn unbound_handler_gets_not_supported() {
    // Registry knows ClearCache, but no Core handler was installed.
    let (_charge_point, central_system) = facade_pair(None).await;

    let err = central_system.clear_cache("CS001").await.unwrap_err();
    match err {
        CallFailure::Peer { code, .. } => assert_eq!(code, ErrorCode::NotSupported),
        other => panic!("expected Peer(NotSupported), got {:?}", other),
    }
}

// ============================================================================
// Single-in-flight rule
// ============================================================================

#[tokio::test]
async fn second_call_fails_busy() {
    let handler = Arc::new(StationCore {
        remote_stops: Mutex::new(Vec::new()),
        start_delay: Some(Duration::from_millis(300)),
    });
    let (_charge_point, central_system) = facade_pair(Some(handler)).await;
    let central_system = Arc::new(central_system);

    let first = {
        let central_system = central_system.clone();
        tokio::spawn(async move {
            central_system
                .remote_start_transaction("CS001", "TOKEN123", |_| {})
                .await
        })
    };

    // Let the first CALL reach the wire before issuing the second.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = central_system.remote_stop_transaction("CS001", 42).await;
    assert!(matches!(second, Err(CallFailure::Busy)));

    // The in-flight call is unaffected.
    let confirmation = first.await.unwrap().unwrap();
    assert_eq!(confirmation.status, RemoteStartStopStatus::Accepted);
}

// ============================================================================
// Timeout, then late reply
// ============================================================================

#[tokio::test]
async fn timeout_resolves_and_late_reply_is_dropped() {
    let config = SessionConfig::default().with_call_timeout(Duration::from_millis(100));
    let (charge_point, mut fars) = raw_pair(config, 1);
    charge_point.start("ws://csms.example/ocpp").await.unwrap();
    let mut far = fars.remove(0);

    let session = charge_point.session().clone();
    let pending_heartbeat = tokio::spawn(async move {
        session.call("Heartbeat", json!({})).await
    });

    // Capture the CALL but never answer it.
    let call = read_frame(&mut far).await;
    let message_id = call[1].as_str().unwrap().to_string();

    let outcome = pending_heartbeat.await.unwrap();
    assert!(matches!(outcome, Err(CallFailure::Timeout)));
    assert!(!charge_point.session().has_pending());

    // A reply arriving after the deadline is dropped without breaking the
    // session.
    far.send(format!(
        r#"[3,"{}",{{"currentTime":"2026-01-20T12:00:00Z"}}]"#,
        message_id
    ))
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(charge_point.is_connected());

    // And the next call still works.
    let session = charge_point.session().clone();
    let next = tokio::spawn(async move { session.call("Heartbeat", json!({})).await });
    let call = read_frame(&mut far).await;
    far.send(format!(
        r#"[3,{},{{"currentTime":"2026-01-20T12:00:00Z"}}]"#,
        call[1]
    ))
    .await
    .unwrap();
    assert!(next.await.unwrap().is_ok());
}

// ============================================================================
// Reconnect semantics
// ============================================================================

#[tokio::test]
async fn disconnect_cancels_and_restart_reattaches() {
    let (charge_point, mut fars) = raw_pair(SessionConfig::default(), 2);
    charge_point.set_core_handler(Arc::new(StationCore::default()));
    charge_point.start("ws://csms.example/ocpp").await.unwrap();

    let mut far = fars.remove(0);
    let session = charge_point.session().clone();
    let pending = tokio::spawn(async move { session.call("Heartbeat", json!({})).await });

    // Swallow the CALL, then drop the transport.
    let _ = read_frame(&mut far).await;
    far.close().await;

    let outcome = pending.await.unwrap();
    assert!(matches!(outcome, Err(CallFailure::SessionClosed)));

    for _ in 0..50 {
        if !charge_point.is_connected() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(!charge_point.is_connected());
    assert!(!charge_point.session().has_pending());

    // Re-start: fresh link, empty table, bindings intact.
    charge_point.start("ws://csms.example/ocpp").await.unwrap();
    let mut far = fars.remove(0);

    let session = charge_point.session().clone();
    let heartbeat = tokio::spawn(async move { session.call("Heartbeat", json!({})).await });
    let call = read_frame(&mut far).await;
    assert_eq!(call[2], json!("Heartbeat"));
    far.send(format!(
        r#"[3,{},{{"currentTime":"2026-01-20T12:00:00Z"}}]"#,
        call[1]
    ))
    .await
    .unwrap();
    assert!(heartbeat.await.unwrap().is_ok());

    // The Core handler survived the reconnect.
    far.send(r#"[2,"m9","RemoteStopTransaction",{"transactionId":42}]"#.to_string())
        .await
        .unwrap();
    let reply = read_frame(&mut far).await;
    assert_eq!(reply[0], json!(3));
    assert_eq!(reply[1], json!("m9"));
    assert_eq!(reply[2], json!({"status": "Accepted"}));
}

// ============================================================================
// Protocol-error replies
// ============================================================================

#[tokio::test]
async fn malformed_known_call_gets_formation_violation() {
    let (charge_point, mut fars) = raw_pair(SessionConfig::default(), 1);
    charge_point.start("ws://csms.example/ocpp").await.unwrap();
    let mut far = fars.remove(0);

    far.send(r#"[2,"m3","RemoteStopTransaction",{"transactionId":"forty-two"}]"#.to_string())
        .await
        .unwrap();
    let reply = read_frame(&mut far).await;
    assert_eq!(reply[0], json!(4));
    assert_eq!(reply[1], json!("m3"));
    assert_eq!(reply[2], json!("FormationViolation"));
}

#[tokio::test]
async fn constraint_violation_gets_property_constraint_reply() {
    let (charge_point, mut fars) = raw_pair(SessionConfig::default(), 1);
    charge_point.start("ws://csms.example/ocpp").await.unwrap();
    let mut far = fars.remove(0);

    far.send(r#"[2,"m4","RemoteStopTransaction",{"transactionId":-5}]"#.to_string())
        .await
        .unwrap();
    let reply = read_frame(&mut far).await;
    assert_eq!(reply[2], json!("PropertyConstraintViolation"));
}

#[tokio::test]
async fn wrong_direction_call_gets_not_supported() {
    // BootNotification is station-initiated; a charge point receiving it
    // must refuse.
    let (charge_point, mut fars) = raw_pair(SessionConfig::default(), 1);
    charge_point.set_core_handler(Arc::new(StationCore::default()));
    charge_point.start("ws://csms.example/ocpp").await.unwrap();
    let mut far = fars.remove(0);

    far.send(
        r#"[2,"m5","BootNotification",{"chargePointVendor":"X","chargePointModel":"Y"}]"#
            .to_string(),
    )
    .await
    .unwrap();
    let reply = read_frame(&mut far).await;
    assert_eq!(reply[2], json!("NotSupported"));
}

// ============================================================================
// Async send form
// ============================================================================

#[tokio::test]
async fn call_with_delivers_exactly_once() {
    let (charge_point, mut fars) = raw_pair(SessionConfig::default(), 1);
    charge_point.start("ws://csms.example/ocpp").await.unwrap();
    let mut far = fars.remove(0);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    charge_point
        .session()
        .call_with("Heartbeat", json!({}), move |outcome| {
            let _ = tx.send(outcome);
        })
        .unwrap();

    let call = read_frame(&mut far).await;
    far.send(format!(
        r#"[3,{},{{"currentTime":"2026-01-20T12:00:00Z"}}]"#,
        call[1]
    ))
    .await
    .unwrap();

    let outcome = rx.recv().await.unwrap();
    assert!(outcome.is_ok());
    assert!(rx.recv().await.is_none());
}

// ============================================================================
// OCPP 2.0.1 smoke
// ============================================================================

mod v201 {
    use std::sync::Arc;

    use async_trait::async_trait;

    use ocppj::error::HandlerFault;
    use ocppj::transport::{memory_link_pair, MemoryConnector};
    use ocppj::v201::types::*;
    use ocppj::v201::{
        ChargingStation, Csms, CsmsProvisioningHandler, StationRemoteControlHandler,
    };
    use ocppj::SessionConfig;

    struct Backoffice;

    #[async_trait]
    impl CsmsProvisioningHandler for Backoffice {
        async fn on_boot_notification(
            &self,
            station_id: &str,
            _request: BootNotificationRequest,
        ) -> Result<BootNotificationResponse, HandlerFault> {
            assert_eq!(station_id, "EK3-001");
            Ok(BootNotificationResponse {
                current_time: chrono::Utc::now(),
                interval: 300,
                status: RegistrationStatus::Accepted,
                status_info: None,
            })
        }
    }

    struct StationRemote;

    #[async_trait]
    impl StationRemoteControlHandler for StationRemote {
        async fn on_request_start_transaction(
            &self,
            _request: RequestStartTransactionRequest,
        ) -> Result<RequestStartTransactionResponse, HandlerFault> {
            Ok(RequestStartTransactionResponse {
                status: GenericStatus::Accepted,
                transaction_id: Some("tx-1".into()),
                status_info: None,
            })
        }

        async fn on_request_stop_transaction(
            &self,
            _request: RequestStopTransactionRequest,
        ) -> Result<RequestStopTransactionResponse, HandlerFault> {
            Ok(RequestStopTransactionResponse {
                status: GenericStatus::Accepted,
                status_info: None,
            })
        }
    }

    #[tokio::test]
    async fn boot_and_remote_stop_roundtrip() {
        let (near, far) = memory_link_pair();
        let connector = MemoryConnector::new();
        connector.provide(near);

        let station = ChargingStation::with_connector(
            "EK3-001",
            Box::new(connector),
            SessionConfig::default(),
        );
        station.set_remote_control_handler(Arc::new(StationRemote));

        let csms = Csms::new();
        csms.set_provisioning_handler(Arc::new(Backoffice));
        csms.attach_station("EK3-001", Box::new(far)).unwrap();

        station.start("ws://csms.example/ocpp").await.unwrap();

        let boot = station
            .boot_notification(
                ChargingStationInfo {
                    model: "EK3".into(),
                    vendor_name: "Elektrokombinacija".into(),
                    serial_number: None,
                    firmware_version: Some("0.1.0".into()),
                },
                BootReason::PowerUp,
            )
            .await
            .unwrap();
        assert_eq!(boot.status, RegistrationStatus::Accepted);
        assert_eq!(boot.interval, 300);

        let stop = csms
            .request_stop_transaction("EK3-001", "tx-1")
            .await
            .unwrap();
        assert_eq!(stop.status, GenericStatus::Accepted);
    }
}
