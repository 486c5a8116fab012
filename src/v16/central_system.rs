//! OCPP 1.6 central system facade
//!
//! Server side of 1.6J: accepts WebSocket connections, keys one session per
//! station id, and exposes typed send methods for every CSMS-initiated
//! feature. Inbound station calls go to a [`CentralSystemCoreHandler`]
//! scoped by station id; connect/disconnect events reach an optional
//! [`CentralSystemObserver`].

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

/// Inbound Core-profile calls the central system answers, scoped by the
/// originating station.
#[async_trait]
pub trait CentralSystemCoreHandler: Send + Sync {
    async fn on_authorize(
        &self,
        station_id: &str,
        request: AuthorizeRequest,
    ) -> Result<AuthorizeConfirmation, HandlerFault>;

    async fn on_boot_notification(
        &self,
        station_id: &str,
        request: BootNotificationRequest,
    ) -> Result<BootNotificationConfirmation, HandlerFault>;

    async fn on_data_transfer(
        &self,
        station_id: &str,
        request: DataTransferRequest,
    ) -> Result<DataTransferConfirmation, HandlerFault>;

    async fn on_heartbeat(
        &self,
        station_id: &str,
        request: HeartbeatRequest,
    ) -> Result<HeartbeatConfirmation, HandlerFault>;

    async fn on_meter_values(
        &self,
        station_id: &str,
        request: MeterValuesRequest,
    ) -> Result<MeterValuesConfirmation, HandlerFault>;

    async fn on_start_transaction(
        &self,
        station_id: &str,
        request: StartTransactionRequest,
    ) -> Result<StartTransactionConfirmation, HandlerFault>;

    async fn on_status_notification(
        &self,
        station_id: &str,
        request: StatusNotificationRequest,
    ) -> Result<StatusNotificationConfirmation, HandlerFault>;

    async fn on_stop_transaction(
        &self,
        station_id: &str,
        request: StopTransactionRequest,
    ) -> Result<StopTransactionConfirmation, HandlerFault>;
}

/// Station lifecycle notifications.
pub trait CentralSystemObserver: Send + Sync {
    fn station_connected(&self, _station_id: &str) {}
    fn station_disconnected(&self, _station_id: &str) {}
}

struct CoreRoute {
    station_id: String,
    handler: Arc<dyn CentralSystemCoreHandler>,
}

#[async_trait]
impl ProfileRoute for CoreRoute {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault> {
        let station_id = self.station_id.as_str();
        match action {
            actions::AUTHORIZE => {
                let confirmation = self
                    .handler
                    .on_authorize(station_id, decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::BOOT_NOTIFICATION => {
                let confirmation = self
                    .handler
                    .on_boot_notification(station_id, decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::DATA_TRANSFER => {
                let confirmation = self
                    .handler
                    .on_data_transfer(station_id, decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::HEARTBEAT => {
                let confirmation = self
                    .handler
                    .on_heartbeat(station_id, decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::METER_VALUES => {
                let confirmation = self
                    .handler
                    .on_meter_values(station_id, decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::START_TRANSACTION => {
                let confirmation = self
                    .handler
                    .on_start_transaction(station_id, decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::STATUS_NOTIFICATION => {
                let confirmation = self
                    .handler
                    .on_status_notification(station_id, decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            actions::STOP_TRANSACTION => {
                let confirmation = self
                    .handler
                    .on_stop_transaction(station_id, decode_request(payload)?)
                    .await?;
                encode_response(confirmation)
            }
            other => Err(HandlerFault::not_supported(format!(
                "unsupported action {} on central system",
                other
            ))),
        }
    }
}

/// A 1.6J central system managing many stations.
pub struct CentralSystem {
    registry: Arc<FeatureRegistry>,
    config: SessionConfig,
    sessions: Arc<DashMap<String, Arc<Session>>>,
    core_handler: RwLock<Option<Arc<dyn CentralSystemCoreHandler>>>,
    observer: RwLock<Option<Arc<dyn CentralSystemObserver>>>,
}

impl Default for CentralSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl CentralSystem {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            registry: Arc::new(registry()),
            config,
            sessions: Arc::new(DashMap::new()),
            core_handler: RwLock::new(None),
            observer: RwLock::new(None),
        }
    }

    /// Installs the inbound handler for stations that connect afterwards.
    /// Setup-time only.
    pub fn set_core_handler(&self, handler: Arc<dyn CentralSystemCoreHandler>) {
        if let Ok(mut slot) = self.core_handler.write() {
            *slot = Some(handler);
        }
    }

    pub fn set_observer(&self, observer: Arc<dyn CentralSystemObserver>) {
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

    /// Accept loop. Negotiates the `ocpp1.6` subprotocol, takes the station
    /// id from the URL path and runs one session per connection.
    pub async fn listen(self: Arc<Self>, addr: &str) -> Result<(), TransportError> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr, "central system listening");

        loop {
            let (stream, peer) = listener.accept().await?;
            let this = self.clone();
            tokio::spawn(async move {
                let accepted = match accept_ocpp(
                    stream,
                    "ocpp1.6",
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

    /// Adopts an already-connected link for a station. The accept loop and
    /// the in-memory test harness both enter here.
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

        let handler = self
            .core_handler
            .read()
            .ok()
            .and_then(|slot| slot.clone());
        if let Some(handler) = handler {
            session.bind_route(
                profiles::CORE,
                Arc::new(CoreRoute {
                    station_id: station_id.to_string(),
                    handler,
                }),
            );
        }

        let loop_handle = session.attach(link)?;

        if self.sessions.insert(station_id.to_string(), session.clone()).is_some() {
            warn!(station_id, "replaced an existing station session");
        }
        if let Some(observer) = self.observer.read().ok().and_then(|slot| slot.clone()) {
            observer.station_connected(station_id);
        }
        info!(station_id, "station connected");

        // Drop the map entry once the session's loop ends.
        let sessions = self.sessions.clone();
        let observer_slot = self
            .observer
            .read()
            .ok()
            .and_then(|slot| slot.clone());
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

    pub async fn change_availability(
        &self,
        station_id: &str,
        connector_id: i32,
        availability_type: AvailabilityType,
    ) -> Result<ChangeAvailabilityConfirmation, CallFailure> {
        let request = ChangeAvailabilityRequest::new(connector_id, availability_type);
        self.session_for(station_id)?
            .call_typed(actions::CHANGE_AVAILABILITY, request)
            .await
    }

    pub async fn change_configuration(
        &self,
        station_id: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<ChangeConfigurationConfirmation, CallFailure> {
        let request = ChangeConfigurationRequest::new(key, value);
        self.session_for(station_id)?
            .call_typed(actions::CHANGE_CONFIGURATION, request)
            .await
    }

    pub async fn clear_cache(
        &self,
        station_id: &str,
    ) -> Result<ClearCacheConfirmation, CallFailure> {
        self.session_for(station_id)?
            .call_typed(actions::CLEAR_CACHE, ClearCacheRequest {})
            .await
    }

    pub async fn data_transfer(
        &self,
        station_id: &str,
        vendor_id: impl Into<String>,
        props: impl FnOnce(&mut DataTransferRequest),
    ) -> Result<DataTransferConfirmation, CallFailure> {
        let mut request = DataTransferRequest::new(vendor_id);
        props(&mut request);
        self.session_for(station_id)?
            .call_typed(actions::DATA_TRANSFER, request)
            .await
    }

    pub async fn get_configuration(
        &self,
        station_id: &str,
        keys: Option<Vec<String>>,
    ) -> Result<GetConfigurationConfirmation, CallFailure> {
        let request = GetConfigurationRequest { key: keys };
        self.session_for(station_id)?
            .call_typed(actions::GET_CONFIGURATION, request)
            .await
    }

    pub async fn remote_start_transaction(
        &self,
        station_id: &str,
        id_tag: impl Into<String>,
        props: impl FnOnce(&mut RemoteStartTransactionRequest),
    ) -> Result<RemoteStartTransactionConfirmation, CallFailure> {
        let mut request = RemoteStartTransactionRequest::new(id_tag);
        props(&mut request);
        self.session_for(station_id)?
            .call_typed(actions::REMOTE_START_TRANSACTION, request)
            .await
    }

    pub async fn remote_stop_transaction(
        &self,
        station_id: &str,
        transaction_id: i32,
    ) -> Result<RemoteStopTransactionConfirmation, CallFailure> {
        let request = RemoteStopTransactionRequest::new(transaction_id);
        self.session_for(station_id)?
            .call_typed(actions::REMOTE_STOP_TRANSACTION, request)
            .await
    }

    pub async fn reset(
        &self,
        station_id: &str,
        reset_type: ResetType,
    ) -> Result<ResetConfirmation, CallFailure> {
        self.session_for(station_id)?
            .call_typed(actions::RESET, ResetRequest::new(reset_type))
            .await
    }

    pub async fn unlock_connector(
        &self,
        station_id: &str,
        connector_id: i32,
    ) -> Result<UnlockConnectorConfirmation, CallFailure> {
        self.session_for(station_id)?
            .call_typed(actions::UNLOCK_CONNECTOR, UnlockConnectorRequest::new(connector_id))
            .await
    }

    pub async fn set_charging_profile(
        &self,
        station_id: &str,
        connector_id: i32,
        profile: ChargingProfile,
    ) -> Result<SetChargingProfileConfirmation, CallFailure> {
        let request = SetChargingProfileRequest::new(connector_id, profile);
        self.session_for(station_id)?
            .call_typed(actions::SET_CHARGING_PROFILE, request)
            .await
    }

    pub async fn clear_charging_profile(
        &self,
        station_id: &str,
        props: impl FnOnce(&mut ClearChargingProfileRequest),
    ) -> Result<ClearChargingProfileConfirmation, CallFailure> {
        let mut request = ClearChargingProfileRequest::default();
        props(&mut request);
        self.session_for(station_id)?
            .call_typed(actions::CLEAR_CHARGING_PROFILE, request)
            .await
    }

    pub async fn get_composite_schedule(
        &self,
        station_id: &str,
        connector_id: i32,
        duration: i32,
        props: impl FnOnce(&mut GetCompositeScheduleRequest),
    ) -> Result<GetCompositeScheduleConfirmation, CallFailure> {
        let mut request = GetCompositeScheduleRequest::new(connector_id, duration);
        props(&mut request);
        self.session_for(station_id)?
            .call_typed(actions::GET_COMPOSITE_SCHEDULE, request)
            .await
    }

    pub async fn reserve_now(
        &self,
        station_id: &str,
        request: ReserveNowRequest,
    ) -> Result<ReserveNowConfirmation, CallFailure> {
        self.session_for(station_id)?
            .call_typed(actions::RESERVE_NOW, request)
            .await
    }

    pub async fn cancel_reservation(
        &self,
        station_id: &str,
        reservation_id: i32,
    ) -> Result<CancelReservationConfirmation, CallFailure> {
        self.session_for(station_id)?
            .call_typed(
                actions::CANCEL_RESERVATION,
                CancelReservationRequest::new(reservation_id),
            )
            .await
    }
}
