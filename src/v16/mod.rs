//! OCPP 1.6J endpoint layer
//!
//! Feature table for the Core, SmartCharging and Reservation profiles plus
//! the two facades: [`ChargePoint`] (client side) and [`CentralSystem`]
//! (server side). Both are thin layers over [`crate::session::Session`]
//! bound to the registry built by [`registry`].

pub mod central_system;
pub mod charge_point;
pub mod types;

pub use central_system::{
    CentralSystem, CentralSystemCoreHandler, CentralSystemObserver,
};
pub use charge_point::{
    ChargePoint, ChargePointCoreHandler, ChargePointReservationHandler,
    ChargePointSmartChargingHandler,
};

use crate::registry::{Direction, FeatureDescriptor, FeatureRegistry, ProtocolVersion};
use types::*;

/// Profile names a 1.6 session may advertise.
pub mod profiles {
    pub const CORE: &str = "Core";
    pub const SMART_CHARGING: &str = "SmartCharging";
    pub const RESERVATION: &str = "Reservation";
}

/// Wire action names.
pub mod actions {
    pub const AUTHORIZE: &str = "Authorize";
    pub const BOOT_NOTIFICATION: &str = "BootNotification";
    pub const CANCEL_RESERVATION: &str = "CancelReservation";
    pub const CHANGE_AVAILABILITY: &str = "ChangeAvailability";
    pub const CHANGE_CONFIGURATION: &str = "ChangeConfiguration";
    pub const CLEAR_CACHE: &str = "ClearCache";
    pub const CLEAR_CHARGING_PROFILE: &str = "ClearChargingProfile";
    pub const DATA_TRANSFER: &str = "DataTransfer";
    pub const GET_COMPOSITE_SCHEDULE: &str = "GetCompositeSchedule";
    pub const GET_CONFIGURATION: &str = "GetConfiguration";
    pub const HEARTBEAT: &str = "Heartbeat";
    pub const METER_VALUES: &str = "MeterValues";
    pub const REMOTE_START_TRANSACTION: &str = "RemoteStartTransaction";
    pub const REMOTE_STOP_TRANSACTION: &str = "RemoteStopTransaction";
    pub const RESERVE_NOW: &str = "ReserveNow";
    pub const RESET: &str = "Reset";
    pub const SET_CHARGING_PROFILE: &str = "SetChargingProfile";
    pub const START_TRANSACTION: &str = "StartTransaction";
    pub const STATUS_NOTIFICATION: &str = "StatusNotification";
    pub const STOP_TRANSACTION: &str = "StopTransaction";
    pub const UNLOCK_CONNECTOR: &str = "UnlockConnector";
}

/// Builds the 1.6 feature registry. Independent from the 2.0.1 registry;
/// a session binds to exactly one.
pub fn registry() -> FeatureRegistry {
    use Direction::{Both, CsmsToStation, StationToCsms};
    const V: ProtocolVersion = ProtocolVersion::V16;

    let features = [
        // Core, station-initiated
        FeatureDescriptor::new::<AuthorizeRequest, AuthorizeConfirmation>(
            actions::AUTHORIZE,
            profiles::CORE,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<BootNotificationRequest, BootNotificationConfirmation>(
            actions::BOOT_NOTIFICATION,
            profiles::CORE,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<HeartbeatRequest, HeartbeatConfirmation>(
            actions::HEARTBEAT,
            profiles::CORE,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<MeterValuesRequest, MeterValuesConfirmation>(
            actions::METER_VALUES,
            profiles::CORE,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<StartTransactionRequest, StartTransactionConfirmation>(
            actions::START_TRANSACTION,
            profiles::CORE,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<StatusNotificationRequest, StatusNotificationConfirmation>(
            actions::STATUS_NOTIFICATION,
            profiles::CORE,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<StopTransactionRequest, StopTransactionConfirmation>(
            actions::STOP_TRANSACTION,
            profiles::CORE,
            V,
            StationToCsms,
        ),
        // Core, CSMS-initiated
        FeatureDescriptor::new::<ChangeAvailabilityRequest, ChangeAvailabilityConfirmation>(
            actions::CHANGE_AVAILABILITY,
            profiles::CORE,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<ChangeConfigurationRequest, ChangeConfigurationConfirmation>(
            actions::CHANGE_CONFIGURATION,
            profiles::CORE,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<ClearCacheRequest, ClearCacheConfirmation>(
            actions::CLEAR_CACHE,
            profiles::CORE,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<GetConfigurationRequest, GetConfigurationConfirmation>(
            actions::GET_CONFIGURATION,
            profiles::CORE,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<RemoteStartTransactionRequest, RemoteStartTransactionConfirmation>(
            actions::REMOTE_START_TRANSACTION,
            profiles::CORE,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<RemoteStopTransactionRequest, RemoteStopTransactionConfirmation>(
            actions::REMOTE_STOP_TRANSACTION,
            profiles::CORE,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<ResetRequest, ResetConfirmation>(
            actions::RESET,
            profiles::CORE,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<UnlockConnectorRequest, UnlockConnectorConfirmation>(
            actions::UNLOCK_CONNECTOR,
            profiles::CORE,
            V,
            CsmsToStation,
        ),
        // Core, either side
        FeatureDescriptor::new::<DataTransferRequest, DataTransferConfirmation>(
            actions::DATA_TRANSFER,
            profiles::CORE,
            V,
            Both,
        ),
        // SmartCharging
        FeatureDescriptor::new::<SetChargingProfileRequest, SetChargingProfileConfirmation>(
            actions::SET_CHARGING_PROFILE,
            profiles::SMART_CHARGING,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<ClearChargingProfileRequest, ClearChargingProfileConfirmation>(
            actions::CLEAR_CHARGING_PROFILE,
            profiles::SMART_CHARGING,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<GetCompositeScheduleRequest, GetCompositeScheduleConfirmation>(
            actions::GET_COMPOSITE_SCHEDULE,
            profiles::SMART_CHARGING,
            V,
            CsmsToStation,
        ),
        // Reservation
        FeatureDescriptor::new::<ReserveNowRequest, ReserveNowConfirmation>(
            actions::RESERVE_NOW,
            profiles::RESERVATION,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<CancelReservationRequest, CancelReservationConfirmation>(
            actions::CANCEL_RESERVATION,
            profiles::RESERVATION,
            V,
            CsmsToStation,
        ),
    ];

    let mut registry = FeatureRegistry::new(V);
    for feature in features {
        registry
            .register(feature)
            .expect("static 1.6 feature table has no collisions");
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Role;

    #[test]
    fn registry_knows_the_core_profile() {
        let registry = registry();
        assert_eq!(
            registry.profile_for(actions::REMOTE_STOP_TRANSACTION),
            Some(profiles::CORE)
        );
        assert_eq!(
            registry.profile_for(actions::RESERVE_NOW),
            Some(profiles::RESERVATION)
        );
        assert_eq!(registry.profile_for("DoTheHokeyPokey"), None);
    }

    #[test]
    fn directions_respect_the_initiating_side() {
        let registry = registry();
        let boot = registry.lookup(actions::BOOT_NOTIFICATION).unwrap();
        assert!(boot.direction.sendable_by(Role::ChargingStation));
        assert!(!boot.direction.sendable_by(Role::Csms));

        let stop = registry.lookup(actions::REMOTE_STOP_TRANSACTION).unwrap();
        assert!(stop.direction.sendable_by(Role::Csms));
        assert!(!stop.direction.sendable_by(Role::ChargingStation));

        let transfer = registry.lookup(actions::DATA_TRANSFER).unwrap();
        assert!(transfer.direction.sendable_by(Role::Csms));
        assert!(transfer.direction.sendable_by(Role::ChargingStation));
    }

    #[test]
    fn registry_validates_known_call_payloads() {
        let registry = registry();
        let descriptor = registry.lookup(actions::REMOTE_STOP_TRANSACTION).unwrap();
        assert!(descriptor
            .request
            .check(&serde_json::json!({"transactionId": 42}))
            .is_ok());
        assert!(descriptor
            .request
            .check(&serde_json::json!({"transactionId": "42"}))
            .is_err());
    }
}
