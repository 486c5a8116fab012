//! OCPP 1.6 charge point facade
//!
//! Client side of a 1.6J session: typed send methods for every
//! station-initiated feature and per-profile handler objects for calls the
//! central system initiates. Optional request fields are set through
//! caller-supplied modifier closures, so the common case stays one line:
//!
//! ```no_run
//! # use ocppj::v16::ChargePoint;
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let charge_point = ChargePoint::new("EK3-001");
//! charge_point.start("ws://localhost:8180/ocpp").await?;
//! let confirmation = charge_point
//!     .boot_notification("Elektrokombinacija", "EK3-OCPP", |req| {
//!         req.firmware_version = Some("0.1.0".into());
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{actions, profiles, registry, types::*};
use crate::config::SessionConfig;
use crate::error::{CallFailure, HandlerFault, TransportError};
use crate::observer::ProtocolObserver;
use crate::registry::Role;
use crate::session::{decode_request, encode_response, ProfileRoute, Session};
use crate::transport::{Connector, WsConnector};

/// Inbound Core-profile calls a charge point answers.
#[async_trait]
pub trait ChargePointCoreHandler: Send + Sync {
    async fn on_change_availability(
        &self,
        request: ChangeAvailabilityRequest,
    ) -> Result<ChangeAvailabilityConfirmation, HandlerFault>;

    async fn on_change_configuration(
        &self,
        request: ChangeConfigurationRequest,
    ) -> Result<ChangeConfigurationConfirmation, HandlerFault>;

    async fn on_clear_cache(
        &self,
        request: ClearCacheRequest,
    ) -> Result<ClearCacheConfirmation, HandlerFault>;

    async fn on_data_transfer(
        &self,
        request: DataTransferRequest,
    ) -> Result<DataTransferConfirmation, HandlerFault>;

    async fn on_get_configuration(
        &self,
        request: GetConfigurationRequest,
    ) -> Result<GetConfigurationConfirmation, HandlerFault>;

    async fn on_remote_start_transaction(
        &self,
        request: RemoteStartTransactionRequest,
    ) -> Result<RemoteStartTransactionConfirmation, HandlerFault>;

    async fn on_remote_stop_transaction(
        &self,
        request: RemoteStopTransactionRequest,
    ) -> Result<RemoteStopTransactionConfirmation, HandlerFault>;

    async fn on_reset(&self, request: ResetRequest) -> Result<ResetConfirmation, HandlerFault>;

    async fn on_unlock_connector(
        &self,
        request: UnlockConnectorRequest,
    ) -> Result<UnlockConnectorConfirmation, HandlerFault>;
}

/// Inbound SmartCharging-profile calls a charge point answers.
#[async_trait]
pub trait ChargePointSmartChargingHandler: Send + Sync {
    async fn on_set_charging_profile(
        &self,
        request: SetChargingProfileRequest,
    ) -> Result<SetChargingProfileConfirmation, HandlerFault>;

    async fn on_clear_charging_profile(
        &self,
        request: ClearChargingProfileRequest,
    ) -> Result<ClearChargingProfileConfirmation, HandlerFault>;

    async fn on_get_composite_schedule(
        &self,
        request: GetCompositeScheduleRequest,
    ) -> Result<GetCompositeScheduleConfirmation, HandlerFault>;
}

/// Inbound Reservation-profile calls a charge point answers.
#[async_trait]
pub trait ChargePointReservationHandler: Send + Sync {
    async fn on_reserve_now(
        &self,
        request: ReserveNowRequest,
    ) -> Result<ReserveNowConfirmation, HandlerFault>;

    async fn on_cancel_reservation(
        &self,
        request: CancelReservationRequest,
    ) -> Result<CancelReservationConfirmation, HandlerFault>;
}

struct CoreRoute {
    handler: Arc<dyn ChargePointCoreHandler>,
}

#[async_trait]
impl ProfileRoute for CoreRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::CHANGE_AVAILABILITY => {
                let confirmation = self
                    .handler
                    .on_change_availability(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::CHANGE_CONFIGURATION => {
                let confirmation = self
                    .handler
                    .on_change_configuration(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::CLEAR_CACHE => {
                let confirmation = self.handler.on_clear_cache(decode_request(payload)?).await?;
                encode_response(confirmation)
            }
            actions::DATA_TRANSFER => {
                let confirmation = self
                    .handler
                    .on_data_transfer(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::GET_CONFIGURATION => {
                let confirmation = self
                    .handler
                    .on_get_configuration(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::REMOTE_START_TRANSACTION => {
                let confirmation = self
                    .handler
                    .on_remote_start_transaction(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::REMOTE_STOP_TRANSACTION => {
                let confirmation = self
                    .handler
                    .on_remote_stop_transaction(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::RESET => {
                let confirmation = self.handler.on_reset(decode_request(payload)?).await?;
                encode_response(confirmation)
            }
            actions::UNLOCK_CONNECTOR => {
                let confirmation = self
                    .handler
                    .on_unlock_connector(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on charge point",
                other
            ))),
        }
    }
}

struct SmartChargingRoute {
    handler: Arc<dyn ChargePointSmartChargingHandler>,
}

#[async_trait]
impl ProfileRoute for SmartChargingRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::SET_CHARGING_PROFILE => {
                let confirmation = self
                    .handler
                    .on_set_charging_profile(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::CLEAR_CHARGING_PROFILE => {
                let confirmation = self
                    .handler
                    .on_clear_charging_profile(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::GET_COMPOSITE_SCHEDULE => {
                let confirmation = self
                    .handler
                    .on_get_composite_schedule(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on charge point",
                other
            ))),
        }
    }
}

struct ReservationRoute {
    handler: Arc<dyn ChargePointReservationHandler>,
}

#[async_trait]
impl ProfileRoute for ReservationRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::RESERVE_NOW => {
                let confirmation = self.handler.on_reserve_now(decode_request(payload)?).await?;
                encode_response(confirmation)
            }
            actions::CANCEL_RESERVATION => {
                let confirmation = self
                    .handler
                    .on_cancel_reservation(decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on charge point",
                other
            ))),
        }
    }
}

/// A 1.6J charge point endpoint.
pub struct ChargePoint {
    station_id: String,
    session: Arc<Session>,
}

impl ChargePoint {
    /// Charge point dialing over WebSocket with default tunables.
    pub fn new(station_id: impl Into<String>) -> Self {
        let config = SessionConfig::default();
        let connector = WsConnector::new(config.max_message_size, config.max_frame_size);
        Self::with_connector(station_id, Box::new(connector), config)
    }

    /// Charge point with an injected connector (tests use the in-memory
    /// one) and explicit tunables.
    pub fn with_connector(
        station_id: impl Into<String>,
        connector: Box<dyn Connector>,
        config: SessionConfig,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            session: Arc::new(Session::new(
                Role::ChargingStation,
                Arc::new(registry()),
                connector,
                config,
            )),
        }
    }

    /// Replaces the session observer. Setup-time only.
    pub fn with_observer(mut self, observer: Arc<dyn ProtocolObserver>) -> Self {
        match Arc::try_unwrap(self.session) {
            Ok(session) => {
                self.session = Arc::new(session.with_observer(observer));
                self
            }
            Err(session) => {
                self.session = session;
                self
            }
        }
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Connects to `<csms_url>/<station_id>` with the `ocpp1.6`
    /// subprotocol.
    pub async fn start(&self, csms_url: &str) -> Result<(), TransportError> {
        let url = format!("{}/{}", csms_url.trim_end_matches('/'), self.station_id);
        self.session.start(&url).await.map(|_| ())
    }

    pub async fn stop(&self) {
        self.session.stop().await;
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_open()
    }

    // -- handler wiring (setup-time, before `start`) ------------------------

    pub fn set_core_handler(&self, handler: Arc<dyn ChargePointCoreHandler>) {
        self.session
            .bind_route(profiles::CORE, Arc::new(CoreRoute { handler }));
    }

    pub fn set_smart_charging_handler(&self, handler: Arc<dyn ChargePointSmartChargingHandler>) {
        self.session.bind_route(
            profiles::SMART_CHARGING,
            Arc::new(SmartChargingRoute { handler }),
        );
    }

    pub fn set_reservation_handler(&self, handler: Arc<dyn ChargePointReservationHandler>) {
        self.session
            .bind_route(profiles::RESERVATION, Arc::new(ReservationRoute { handler }));
    }

    // -- outbound features --------------------------------------------------

    pub async fn authorize(
        &self,
        id_tag: impl Into<String>,
        props: impl FnOnce(&mut AuthorizeRequest),
    ) -> Result<AuthorizeConfirmation, CallFailure> {
        let mut request = AuthorizeRequest::new(id_tag);
        props(&mut request);
        self.session.call_typed(actions::AUTHORIZE, request).await
    }

    pub async fn boot_notification(
        &self,
        vendor: impl Into<String>,
        model: impl Into<String>,
        props: impl FnOnce(&mut BootNotificationRequest),
    ) -> Result<BootNotificationConfirmation, CallFailure> {
        let mut request = BootNotificationRequest::new(vendor, model);
        props(&mut request);
        self.session
            .call_typed(actions::BOOT_NOTIFICATION, request)
            .await
    }

    pub async fn data_transfer(
        &self,
        vendor_id: impl Into<String>,
        props: impl FnOnce(&mut DataTransferRequest),
    ) -> Result<DataTransferConfirmation, CallFailure> {
        let mut request = DataTransferRequest::new(vendor_id);
        props(&mut request);
        self.session.call_typed(actions::DATA_TRANSFER, request).await
    }

    pub async fn heartbeat(&self) -> Result<HeartbeatConfirmation, CallFailure> {
        self.session
            .call_typed(actions::HEARTBEAT, HeartbeatRequest {})
            .await
    }

    pub async fn meter_values(
        &self,
        connector_id: i32,
        meter_value: Vec<MeterValue>,
        props: impl FnOnce(&mut MeterValuesRequest),
    ) -> Result<MeterValuesConfirmation, CallFailure> {
        let mut request = MeterValuesRequest::new(connector_id, meter_value);
        props(&mut request);
        self.session.call_typed(actions::METER_VALUES, request).await
    }

    pub async fn start_transaction(
        &self,
        connector_id: i32,
        id_tag: impl Into<String>,
        meter_start: i32,
        props: impl FnOnce(&mut StartTransactionRequest),
    ) -> Result<StartTransactionConfirmation, CallFailure> {
        let mut request = StartTransactionRequest::new(connector_id, id_tag, meter_start);
        props(&mut request);
        self.session
            .call_typed(actions::START_TRANSACTION, request)
            .await
    }

    pub async fn status_notification(
        &self,
        connector_id: i32,
        error_code: ChargePointErrorCode,
        status: ChargePointStatus,
        props: impl FnOnce(&mut StatusNotificationRequest),
    ) -> Result<StatusNotificationConfirmation, CallFailure> {
        let mut request = StatusNotificationRequest::new(connector_id, error_code, status);
        props(&mut request);
        self.session
            .call_typed(actions::STATUS_NOTIFICATION, request)
            .await
    }

    pub async fn stop_transaction(
        &self,
        meter_stop: i32,
        transaction_id: i32,
        props: impl FnOnce(&mut StopTransactionRequest),
    ) -> Result<StopTransactionConfirmation, CallFailure> {
        let mut request = StopTransactionRequest::new(meter_stop, transaction_id);
        props(&mut request);
        self.session
            .call_typed(actions::STOP_TRANSACTION, request)
            .await
    }
}
