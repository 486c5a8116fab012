//! OCPP 2.0.1 CSMS facade
//!
//! Server side of 2.0.1: accepts WebSocket connections, keys one session
//! per station id, and exposes typed send methods for the CSMS-initiated
//! features. Inbound station calls are routed to per-profile handlers
//! scoped by station id.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::{actions, profiles, registry, types::*};
use crate::config::SessionConfig;
use crate::error::{CallFailure, HandlerFault, TransportError};
use crate::registry::{FeatureRegistry, Role};
use crate::session::{decode_request, encode_response, ProfileRoute, Session};
use crate::transport::{accept_ocpp, station_id_from_path, MessageLink, NullConnector};

/// Inbound Provisioning-profile calls the CSMS answers.
#[async_trait]
pub trait CsmsProvisioningHandler: Send + Sync {
    async fn on_boot_notification(
        &self,
        station_id: &str,
        request: BootNotificationRequest,
    ) -> Result<BootNotificationResponse, HandlerFault>;
}

/// Inbound Availability-profile calls the CSMS answers.
#[async_trait]
pub trait CsmsAvailabilityHandler: Send + Sync {
    async fn on_heartbeat(
        &self,
        station_id: &str,
        request: HeartbeatRequest,
    ) -> Result<HeartbeatResponse, HandlerFault>;

    async fn on_status_notification(
        &self,
        station_id: &str,
        request: StatusNotificationRequest,
    ) -> Result<StatusNotificationResponse, HandlerFault>;
}

/// Inbound Metering-profile calls the CSMS answers.
#[async_trait]
pub trait CsmsMeteringHandler: Send + Sync {
    async fn on_meter_values(
        &self,
        station_id: &str,
        request: MeterValuesRequest,
    ) -> Result<MeterValuesResponse, HandlerFault>;
}

/// Inbound Transactions-profile calls the CSMS answers.
#[async_trait]
pub trait CsmsTransactionsHandler: Send + Sync {
    async fn on_transaction_event(
        &self,
        station_id: &str,
        request: TransactionEventRequest,
    ) -> Result<TransactionEventResponse, HandlerFault>;
}

/// Inbound DataTransfer calls the CSMS answers.
#[async_trait]
pub trait CsmsDataHandler: Send + Sync {
    async fn on_data_transfer(
        &self,
        station_id: &str,
        request: DataTransferRequest,
    ) -> Result<DataTransferResponse, HandlerFault>;
}

/// Station lifecycle notifications.
pub trait CsmsObserver: Send + Sync {
    fn station_connected(&self, _station_id: &str) {}
    fn station_disconnected(&self, _station_id: &str) {}
}

struct ProvisioningRoute {
    station_id: String,
    handler: Arc<dyn CsmsProvisioningHandler>,
}

#[async_trait]
impl ProfileRoute for ProvisioningRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::BOOT_NOTIFICATION => {
                let response = self
                    .handler
                    .on_boot_notification(&self.station_id, decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on CSMS",
                other
            ))),
        }
    }
}

struct AvailabilityRoute {
    station_id: String,
    handler: Arc<dyn CsmsAvailabilityHandler>,
}

#[async_trait]
impl ProfileRoute for AvailabilityRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::HEARTBEAT => {
                let response = self
                    .handler
                    .on_heartbeat(&self.station_id, decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            actions::STATUS_NOTIFICATION => {
                let response = self
                    .handler
                    .on_status_notification(&self.station_id, decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on CSMS",
                other
            ))),
        }
    }
}

struct MeteringRoute {
    station_id: String,
    handler: Arc<dyn CsmsMeteringHandler>,
}

#[async_trait]
impl ProfileRoute for MeteringRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::METER_VALUES => {
                let response = self
                    .handler
                    .on_meter_values(&self.station_id, decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on CSMS",
                other
            ))),
        }
    }
}

struct TransactionsRoute {
    station_id: String,
    handler: Arc<dyn CsmsTransactionsHandler>,
}

#[async_trait]
impl ProfileRoute for TransactionsRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::TRANSACTION_EVENT => {
                let response = self
                    .handler
                    .on_transaction_event(&self.station_id, decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on CSMS",
                other
            ))),
        }
    }
}

struct DataRoute {
    station_id: String,
    handler: Arc<dyn CsmsDataHandler>,
}

#[async_trait]
impl ProfileRoute for DataRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        match action {
            actions::DATA_TRANSFER => {
                let response = self
                    .handler
                    .on_data_transfer(&self.station_id, decode_request(payload)?)
                    .await?;
                encode_response(response)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on CSMS",
                other
            ))),
        }
    }
}

/// A 2.0.1 CSMS managing many stations.
pub struct Csms {
    registry: Arc<FeatureRegistry>,
    config: SessionConfig,
    sessions: Arc<DashMap<String, Arc<Session>>>,
    provisioning: RwLock<Option<Arc<dyn CsmsProvisioningHandler>>>,
    availability: RwLock<Option<Arc<dyn CsmsAvailabilityHandler>>>,
    metering: RwLock<Option<Arc<dyn CsmsMeteringHandler>>>,
    transactions: RwLock<Option<Arc<dyn CsmsTransactionsHandler>>>,
    data: RwLock<Option<Arc<dyn CsmsDataHandler>>>,
    observer: RwLock<Option<Arc<dyn CsmsObserver>>>,
}

impl Default for Csms {
    fn default() -> Self {
        Self::new()
    }
}

fn installed<T: ?Sized>(slot: &RwLock<Option<Arc<T>>>) -> Option<Arc<T>> {
    slot.read().ok().and_then(|guard| guard.clone())
}

impl Csms {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            registry: Arc::new(registry()),
            config,
            sessions: Arc::new(DashMap::new()),
            provisioning: RwLock::new(None),
            availability: RwLock::new(None),
            metering: RwLock::new(None),
            transactions: RwLock::new(None),
            data: RwLock::new(None),
            observer: RwLock::new(None),
        }
    }

    // Handler setters apply to stations that connect afterwards.
    // Setup-time only.

    pub fn set_provisioning_handler(&self, handler: Arc<dyn CsmsProvisioningHandler>) {
        if let Ok(mut slot) = self.provisioning.write() {
            *slot = Some(handler);
        }
    }

    pub fn set_availability_handler(&self, handler: Arc<dyn CsmsAvailabilityHandler>) {
        if let Ok(mut slot) = self.availability.write() {
            *slot = Some(handler);
        }
    }

    pub fn set_metering_handler(&self, handler: Arc<dyn CsmsMeteringHandler>) {
        if let Ok(mut slot) = self.metering.write() {
            *slot = Some(handler);
        }
    }

    pub fn set_transactions_handler(&self, handler: Arc<dyn CsmsTransactionsHandler>) {
        if let Ok(mut slot) = self.transactions.write() {
            *slot = Some(handler);
        }
    }

    pub fn set_data_handler(&self, handler: Arc<dyn CsmsDataHandler>) {
        if let Ok(mut slot) = self.data.write() {
            *slot = Some(handler);
        }
    }

    pub fn set_observer(&self, observer: Arc<dyn CsmsObserver>) {
        if let Ok(mut slot) = self.observer.write() {
            *slot = Some(observer);
        }
    }

    pub fn connected_stations(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    pub fn is_connected(&self, station_id: &str) -> bool {
        self.sessions
            .get(station_id)
            .map(|s| s.is_open())
            .unwrap_or(false)
    }

    /// Accept loop speaking the `ocpp2.0.1` subprotocol.
    pub async fn listen(self: Arc<Self>, addr: &str) -> Result<(), TransportError> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr, "CSMS listening");

        loop {
            let (stream, peer) = listener.accept().await?;
            let this = self.clone();
            tokio::spawn(async move {
                let accepted = match accept_ocpp(
                    stream,
                    "ocpp2.0.1",
                    this.config.max_message_size,
                    this.config.max_frame_size,
                )
                .await
                {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(%peer, error = %e, "websocket handshake failed");
                        return;
                    }
                };

                let station_id = match station_id_from_path(&accepted.path) {
                    Some(id) => id.to_string(),
                    None => {
                        warn!(%peer, path = accepted.path, "connection without station id");
                        return;
                    }
                };

                if let Err(e) = this.attach_station(&station_id, Box::new(accepted.link)) {
                    warn!(station_id, error = %e, "failed to attach station");
                }
            });
        }
    }

    /// Adopts an already-connected link for a station.
    pub fn attach_station(
        &self,
        station_id: &str,
        link: Box<dyn MessageLink>,
    ) -> Result<Arc<Session>, TransportError> {
        let session = Arc::new(Session::new(
            Role::Csms,
            self.registry.clone(),
            Box::new(NullConnector),
            self.config.clone(),
        ));

        if let Some(handler) = installed(&self.provisioning) {
            session.bind_route(
                profiles::PROVISIONING,
                Arc::new(ProvisioningRoute {
                    station_id: station_id.to_string(),
                    handler,
                }),
            );
        }
        if let Some(handler) = installed(&self.availability) {
            session.bind_route(
                profiles::AVAILABILITY,
                Arc::new(AvailabilityRoute {
                    station_id: station_id.to_string(),
                    handler,
                }),
            );
        }
        if let Some(handler) = installed(&self.metering) {
            session.bind_route(
                profiles::METERING,
                Arc::new(MeteringRoute {
                    station_id: station_id.to_string(),
                    handler,
                }),
            );
        }
        if let Some(handler) = installed(&self.transactions) {
            session.bind_route(
                profiles::TRANSACTIONS,
                Arc::new(TransactionsRoute {
                    station_id: station_id.to_string(),
                    handler,
                }),
            );
        }
        if let Some(handler) = installed(&self.data) {
            session.bind_route(
                profiles::DATA,
                Arc::new(DataRoute {
                    station_id: station_id.to_string(),
                    handler,
                }),
            );
        }

        let loop_handle = session.attach(link)?;

        if self
            .sessions
            .insert(station_id.to_string(), session.clone())
            .is_some()
        {
            warn!(station_id, "replaced an existing station session");
        }
        if let Some(observer) = installed(&self.observer) {
            observer.station_connected(station_id);
        }
        info!(station_id, "station connected");

        let sessions = self.sessions.clone();
        let observer_slot = installed(&self.observer);
        let station = station_id.to_string();
        let tracked = session.clone();
        tokio::spawn(async move {
            let _ = loop_handle.await;
            sessions.remove_if(&station, |_, current| Arc::ptr_eq(current, &tracked));
            if let Some(observer) = observer_slot {
                observer.station_disconnected(&station);
            }
            info!(station_id = station, "station disconnected");
        });

        Ok(session)
    }

    fn session_for(&self, station_id: &str) -> Result<Arc<Session>, CallFailure> {
        self.sessions
            .get(station_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CallFailure::UnknownStation(station_id.to_string()))
    }

    // -- outbound features --------------------------------------------------

    pub async fn get_variables(
        &self,
        station_id: &str,
        get_variable_data: Vec<GetVariableData>,
    ) -> Result<GetVariablesResponse, CallFailure> {
        let request = GetVariablesRequest { get_variable_data };
        self.session_for(station_id)?
            .call_typed(actions::GET_VARIABLES, request)
            .await
    }

    pub async fn set_variables(
        &self,
        station_id: &str,
        set_variable_data: Vec<SetVariableData>,
    ) -> Result<SetVariablesResponse, CallFailure> {
        let request = SetVariablesRequest { set_variable_data };
        self.session_for(station_id)?
            .call_typed(actions::SET_VARIABLES, request)
            .await
    }

    pub async fn reset(
        &self,
        station_id: &str,
        kind: ResetKind,
        props: impl FnOnce(&mut ResetRequest),
    ) -> Result<ResetResponse, CallFailure> {
        let mut request = ResetRequest::new(kind);
        props(&mut request);
        self.session_for(station_id)?
            .call_typed(actions::RESET, request)
            .await
    }

    pub async fn request_start_transaction(
        &self,
        station_id: &str,
        id_token: IdToken,
        remote_start_id: i32,
        props: impl FnOnce(&mut RequestStartTransactionRequest),
    ) -> Result<RequestStartTransactionResponse, CallFailure> {
        let mut request = RequestStartTransactionRequest::new(id_token, remote_start_id);
        props(&mut request);
        self.session_for(station_id)?
            .call_typed(actions::REQUEST_START_TRANSACTION, request)
            .await
    }

    pub async fn request_stop_transaction(
        &self,
        station_id: &str,
        transaction_id: impl Into<String>,
    ) -> Result<RequestStopTransactionResponse, CallFailure> {
        let request = RequestStopTransactionRequest::new(transaction_id);
        self.session_for(station_id)?
            .call_typed(actions::REQUEST_STOP_TRANSACTION, request)
            .await
    }

    pub async fn set_charging_profile(
        &self,
        station_id: &str,
        evse_id: i32,
        charging_profile: ChargingProfile,
    ) -> Result<SetChargingProfileResponse, CallFailure> {
        let request = SetChargingProfileRequest::new(evse_id, charging_profile);
        self.session_for(station_id)?
            .call_typed(actions::SET_CHARGING_PROFILE, request)
            .await
    }

    pub async fn reserve_now(
        &self,
        station_id: &str,
        request: ReserveNowRequest,
    ) -> Result<ReserveNowResponse, CallFailure> {
        self.session_for(station_id)?
            .call_typed(actions::RESERVE_NOW, request)
            .await
    }

    pub async fn cancel_reservation(
        &self,
        station_id: &str,
        reservation_id: i32,
    ) -> Result<CancelReservationResponse, CallFailure> {
        self.session_for(station_id)?
            .call_typed(
                actions::CANCEL_RESERVATION,
                CancelReservationRequest::new(reservation_id),
            )
            .await
    }

    pub async fn data_transfer(
        &self,
        station_id: &str,
        vendor_id: impl Into<String>,
        props: impl FnOnce(&mut DataTransferRequest),
    ) -> Result<DataTransferResponse, CallFailure> {
        let mut request = DataTransferRequest::new(vendor_id);
        props(&mut request);
        self.session_for(station_id)?
            .call_typed(actions::DATA_TRANSFER, request)
            .await
    }
}
