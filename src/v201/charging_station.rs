//! OCPP 2.0.1 charging station facade
//!
//! Client side of a 2.0.1 session: typed send methods for the
//! station-initiated features and per-profile handler objects for calls the
//! CSMS initiates.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{actions, profiles, registry, types::*};
use crate::config::SessionConfig;
use crate::error::{CallFailure, HandlerFault, TransportError};
use crate::registry::Role;
use crate::session::{decode_request, encode_response, ProfileRoute, Session};
use crate::transport::{Connector, WsConnector};

/// Inbound Provisioning-profile calls a station answers.
#[async_trait]
pub trait StationProvisioningHandler: Send + Sync {
    async fn on_get_variables(
        &self,
        request: GetVariablesRequest,
    ) -> Result<GetVariablesResponse, HandlerFault>;

    async fn on_set_variables(
        &self,
        request: SetVariablesRequest,
    ) -> Result<SetVariablesResponse, HandlerFault>;

    async fn on_reset(&self, request: ResetRequest) -> Result<ResetResponse, HandlerFault>;
}

/// Inbound RemoteControl-profile calls a station answers.
#[async_trait]
pub trait StationRemoteControlHandler: Send + Sync {
    async fn on_request_start_transaction(
        &self,
        request: RequestStartTransactionRequest,
    ) -> Result<RequestStartTransactionResponse, HandlerFault>;

    async fn on_request_stop_transaction(
        &self,
        request: RequestStopTransactionRequest,
    ) -> Result<RequestStopTransactionResponse, HandlerFault>;
}

/// Inbound SmartCharging-profile calls a station answers.
#[async_trait]
pub trait StationSmartChargingHandler: Send + Sync {
    async fn on_set_charging_profile(
        &self,
        request: SetChargingProfileRequest,
    ) -> Result<SetChargingProfileResponse, HandlerFault>;
}

/// Inbound Reservation-profile calls a station answers.
#[async_trait]
pub trait StationReservationHandler: Send + Sync {
    async fn on_reserve_now(
        &self,
        request: ReserveNowRequest,
    ) -> Result<ReserveNowResponse, HandlerFault>;

    async fn on_cancel_reservation(
        &self,
        request: CancelReservationRequest,
    ) -> Result<CancelReservationResponse, HandlerFault>;
}

/// Inbound DataTransfer calls a station answers.
#[async_trait]
pub trait StationDataHandler: Send + Sync {
    async fn on_data_transfer(
        &self,
        request: DataTransferRequest,
    ) -> Result<DataTransferResponse, HandlerFault>;
}

struct ProvisioningRoute {
    handler: Arc<dyn StationProvisioningHandler>,
}

#[async_trait]
impl ProfileRoute for ProvisioningRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::GET_VARIABLES => {
                let response = self
                    .handler
                    .on_get_variables(decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            actions::SET_VARIABLES => {
                let response = self
                    .handler
                    .on_set_variables(decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            actions::RESET => {
                let response = self.handler.on_reset(decode_request(payload)?).await?;
                encode_response(response)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on charging station",
                other
            ))),
        }
    }
}

struct RemoteControlRoute {
    handler: Arc<dyn StationRemoteControlHandler>,
}

#[async_trait]
impl ProfileRoute for RemoteControlRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::REQUEST_START_TRANSACTION => {
                let response = self
                    .handler
                    .on_request_start_transaction(decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            actions::REQUEST_STOP_TRANSACTION => {
                let response = self
                    .handler
                    .on_request_stop_transaction(decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on charging station",
                other
            ))),
        }
    }
}

struct SmartChargingRoute {
    handler: Arc<dyn StationSmartChargingHandler>,
}

#[async_trait]
impl ProfileRoute for SmartChargingRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::SET_CHARGING_PROFILE => {
                let response = self
                    .handler
                    .on_set_charging_profile(decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on charging station",
                other
            ))),
        }
    }
}

struct ReservationRoute {
    handler: Arc<dyn StationReservationHandler>,
}

#[async_trait]
impl ProfileRoute for ReservationRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::RESERVE_NOW => {
                let response = self.handler.on_reserve_now(decode_request(payload)?).await?;
                encode_response(response)
            }
            actions::CANCEL_RESERVATION => {
                let response = self
                    .handler
                    .on_cancel_reservation(decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on charging station",
                other
            ))),
        }
    }
}

struct DataRoute {
    handler: Arc<dyn StationDataHandler>,
}

#[async_trait]
impl ProfileRoute for DataRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::DATA_TRANSFER => {
                let response = self
                    .handler
                    .on_data_transfer(decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on charging station",
                other
            ))),
        }
    }
}

/// A 2.0.1 charging station endpoint.
pub struct ChargingStation {
    station_id: String,
    session: Arc<Session>,
}

impl ChargingStation {
    pub fn new(station_id: impl Into<String>) -> Self {
        let config = SessionConfig::default();
        let connector = WsConnector::new(config.max_message_size, config.max_frame_size);
        Self::with_connector(station_id, Box::new(connector), config)
    }

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

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Connects to `<csms_url>/<station_id>` with the `ocpp2.0.1`
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

    pub fn set_provisioning_handler(&self, handler: Arc<dyn StationProvisioningHandler>) {
        self.session
            .bind_route(profiles::PROVISIONING, Arc::new(ProvisioningRoute { handler }));
    }

    pub fn set_remote_control_handler(&self, handler: Arc<dyn StationRemoteControlHandler>) {
        self.session.bind_route(
            profiles::REMOTE_CONTROL,
            Arc::new(RemoteControlRoute { handler }),
        );
    }

    pub fn set_smart_charging_handler(&self, handler: Arc<dyn StationSmartChargingHandler>) {
        self.session.bind_route(
            profiles::SMART_CHARGING,
            Arc::new(SmartChargingRoute { handler }),
        );
    }

    pub fn set_reservation_handler(&self, handler: Arc<dyn StationReservationHandler>) {
        self.session
            .bind_route(profiles::RESERVATION, Arc::new(ReservationRoute { handler }));
    }

    pub fn set_data_handler(&self, handler: Arc<dyn StationDataHandler>) {
        self.session
            .bind_route(profiles::DATA, Arc::new(DataRoute { handler }));
    }

    // -- outbound features --------------------------------------------------

    pub async fn boot_notification(
        &self,
        charging_station: ChargingStationInfo,
        reason: BootReason,
    ) -> Result<BootNotificationResponse, CallFailure> {
        let request = BootNotificationRequest::new(charging_station, reason);
        self.session
            .call_typed(actions::BOOT_NOTIFICATION, request)
            .await
    }

    pub async fn heartbeat(&self) -> Result<HeartbeatResponse, CallFailure> {
        self.session
            .call_typed(actions::HEARTBEAT, HeartbeatRequest {})
            .await
    }

    pub async fn status_notification(
        &self,
        evse_id: i32,
        connector_id: i32,
        connector_status: ConnectorStatus,
    ) -> Result<StatusNotificationResponse, CallFailure> {
        let request = StatusNotificationRequest::new(evse_id, connector_id, connector_status);
        self.session
            .call_typed(actions::STATUS_NOTIFICATION, request)
            .await
    }

    pub async fn meter_values(
        &self,
        evse_id: i32,
        meter_value: Vec<MeterValue>,
    ) -> Result<MeterValuesResponse, CallFailure> {
        let request = MeterValuesRequest::new(evse_id, meter_value);
        self.session.call_typed(actions::METER_VALUES, request).await
    }

    pub async fn transaction_event(
        &self,
        event_type: TransactionEventKind,
        trigger_reason: TriggerReason,
        seq_no: i32,
        transaction_info: Transaction,
        props: impl FnOnce(&mut TransactionEventRequest),
    ) -> Result<TransactionEventResponse, CallFailure> {
        let mut request =
            TransactionEventRequest::new(event_type, trigger_reason, seq_no, transaction_info);
        props(&mut request);
        self.session
            .call_typed(actions::TRANSACTION_EVENT, request)
            .await
    }

    pub async fn data_transfer(
        &self,
        vendor_id: impl Into<String>,
        props: impl FnOnce(&mut DataTransferRequest),
    ) -> Result<DataTransferResponse, CallFailure> {
        let mut request = DataTransferRequest::new(vendor_id);
        props(&mut request);
        self.session.call_typed(actions::DATA_TRANSFER, request).await
    }
}
