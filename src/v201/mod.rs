//! OCPP 2.0.1 endpoint layer
//!
//! Feature table and the two facades: [`ChargingStation`] (client side) and
//! [`Csms`] (server side). Both are thin layers over
//! [`crate::session::Session`] bound to the registry built by [`registry`].

pub mod charging_station;
pub mod csms;
pub mod types;

pub use charging_station::{
    ChargingStation, StationDataHandler, StationProvisioningHandler, StationRemoteControlHandler,
    StationReservationHandler, StationSmartChargingHandler,
};
pub use csms::{
    Csms, CsmsAvailabilityHandler, CsmsDataHandler, CsmsMeteringHandler, CsmsObserver,
    CsmsProvisioningHandler, CsmsTransactionsHandler,
};

use crate::registry::{Direction, FeatureDescriptor, FeatureRegistry, ProtocolVersion};
use types::*;

/// Profile names a 2.0.1 session may advertise.
pub mod profiles {
    pub const PROVISIONING: &str = "Provisioning";
    pub const AVAILABILITY: &str = "Availability";
    pub const METERING: &str = "Metering";
    pub const TRANSACTIONS: &str = "Transactions";
    pub const REMOTE_CONTROL: &str = "RemoteControl";
    pub const SMART_CHARGING: &str = "SmartCharging";
    pub const RESERVATION: &str = "Reservation";
    pub const DATA: &str = "Data";
}

/// Wire action names.
pub mod actions {
    pub const BOOT_NOTIFICATION: &str = "BootNotification";
    pub const CANCEL_RESERVATION: &str = "CancelReservation";
    pub const DATA_TRANSFER: &str = "DataTransfer";
    pub const GET_VARIABLES: &str = "GetVariables";
    pub const HEARTBEAT: &str = "Heartbeat";
    pub const METER_VALUES: &str = "MeterValues";
    pub const REQUEST_START_TRANSACTION: &str = "RequestStartTransaction";
    pub const REQUEST_STOP_TRANSACTION: &str = "RequestStopTransaction";
    pub const RESERVE_NOW: &str = "ReserveNow";
    pub const RESET: &str = "Reset";
    pub const SET_CHARGING_PROFILE: &str = "SetChargingProfile";
    pub const SET_VARIABLES: &str = "SetVariables";
    pub const STATUS_NOTIFICATION: &str = "StatusNotification";
    pub const TRANSACTION_EVENT: &str = "TransactionEvent";
}

/// Builds the 2.0.1 feature registry.
pub fn registry() -> FeatureRegistry {
    use Direction::{Both, CsmsToStation, StationToCsms};
    const V: ProtocolVersion = ProtocolVersion::V201;

    let features = [
        FeatureDescriptor::new::<BootNotificationRequest, BootNotificationResponse>(
            actions::BOOT_NOTIFICATION,
            profiles::PROVISIONING,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<GetVariablesRequest, GetVariablesResponse>(
            actions::GET_VARIABLES,
            profiles::PROVISIONING,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<SetVariablesRequest, SetVariablesResponse>(
            actions::SET_VARIABLES,
            profiles::PROVISIONING,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<ResetRequest, ResetResponse>(
            actions::RESET,
            profiles::PROVISIONING,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<HeartbeatRequest, HeartbeatResponse>(
            actions::HEARTBEAT,
            profiles::AVAILABILITY,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<StatusNotificationRequest, StatusNotificationResponse>(
            actions::STATUS_NOTIFICATION,
            profiles::AVAILABILITY,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<MeterValuesRequest, MeterValuesResponse>(
            actions::METER_VALUES,
            profiles::METERING,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<TransactionEventRequest, TransactionEventResponse>(
            actions::TRANSACTION_EVENT,
            profiles::TRANSACTIONS,
            V,
            StationToCsms,
        ),
        FeatureDescriptor::new::<RequestStartTransactionRequest, RequestStartTransactionResponse>(
            actions::REQUEST_START_TRANSACTION,
            profiles::REMOTE_CONTROL,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<RequestStopTransactionRequest, RequestStopTransactionResponse>(
            actions::REQUEST_STOP_TRANSACTION,
            profiles::REMOTE_CONTROL,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<SetChargingProfileRequest, SetChargingProfileResponse>(
            actions::SET_CHARGING_PROFILE,
            profiles::SMART_CHARGING,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<ReserveNowRequest, ReserveNowResponse>(
            actions::RESERVE_NOW,
            profiles::RESERVATION,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<CancelReservationRequest, CancelReservationResponse>(
            actions::CANCEL_RESERVATION,
            profiles::RESERVATION,
            V,
            CsmsToStation,
        ),
        FeatureDescriptor::new::<DataTransferRequest, DataTransferResponse>(
            actions::DATA_TRANSFER,
            profiles::DATA,
            V,
            Both,
        ),
    ];

    let mut registry = FeatureRegistry::new(V);
    for feature in features {
        registry
            .register(feature)
            .expect("static 2.0.1 feature table has no collisions");
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_groups_features_into_profiles() {
        let registry = registry();
        assert_eq!(
            registry.profile_for(actions::BOOT_NOTIFICATION),
            Some(profiles::PROVISIONING)
        );
        assert_eq!(
            registry.profile_for(actions::TRANSACTION_EVENT),
            Some(profiles::TRANSACTIONS)
        );
        assert_eq!(
            registry.profile_for(actions::REQUEST_STOP_TRANSACTION),
            Some(profiles::REMOTE_CONTROL)
        );
        assert_eq!(registry.version().subprotocol(), "ocpp2.0.1");
    }

    #[test]
    fn registries_for_the_two_versions_are_independent() {
        let v16 = crate::v16::registry();
        let v201 = registry();

        // RemoteStopTransaction is a 1.6 name; 2.0.1 uses
        // RequestStopTransaction.
        assert!(v16.lookup("RemoteStopTransaction").is_some());
        assert!(v201.lookup("RemoteStopTransaction").is_none());
        assert!(v201.lookup("RequestStopTransaction").is_some());
        assert!(v16.lookup("RequestStopTransaction").is_none());
    }
}
