//! OCPP 1.6 message types
//!
//! Request/confirmation payloads and shared field types for the Core,
//! SmartCharging and Reservation profiles. Field names follow the 1.6J
//! wire format (camelCase); optional fields are skipped when absent.
//!
//! Constraint validation implements the CiString length limits and numeric
//! bounds of the 1.6 specification; shape checking is serde's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{Constraints, Validate, Violation};

// ============================================================================
// Enumerations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    Accepted,
    Blocked,
    Expired,
    Invalid,
    ConcurrentTx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Accepted,
    Pending,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteStartStopStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetType {
    Hard,
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityType {
    Inoperative,
    Operative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    Accepted,
    Rejected,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigurationStatus {
    Accepted,
    Rejected,
    RebootRequired,
    NotSupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearCacheStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataTransferStatus {
    Accepted,
    Rejected,
    UnknownMessageId,
    UnknownVendorId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargePointStatus {
    Available,
    Preparing,
    Charging,
    #[serde(rename = "SuspendedEVSE")]
    SuspendedEvse,
    #[serde(rename = "SuspendedEV")]
    SuspendedEv,
    Finishing,
    Reserved,
    Unavailable,
    Faulted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargePointErrorCode {
    ConnectorLockFailure,
    #[serde(rename = "EVCommunicationError")]
    EvCommunicationError,
    GroundFailure,
    HighTemperature,
    InternalError,
    LocalListConflict,
    NoError,
    OtherError,
    OverCurrentFailure,
    OverVoltage,
    PowerMeterFailure,
    PowerSwitchFailure,
    ReaderFailure,
    ResetFailure,
    UnderVoltage,
    WeakSignal,
}

/// Reason a transaction stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    DeAuthorized,
    EmergencyStop,
    #[serde(rename = "EVDisconnected")]
    EvDisconnected,
    HardReset,
    Local,
    Other,
    PowerLoss,
    Reboot,
    Remote,
    SoftReset,
    UnlockCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnlockStatus {
    Unlocked,
    UnlockFailed,
    NotSupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Accepted,
    Faulted,
    Occupied,
    Rejected,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReservationStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingProfilePurpose {
    ChargePointMaxProfile,
    TxDefaultProfile,
    TxProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingProfileKind {
    Absolute,
    Recurring,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrencyKind {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingRateUnit {
    W,
    A,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingProfileStatus {
    Accepted,
    Rejected,
    NotSupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearChargingProfileStatus {
    Accepted,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GetCompositeScheduleStatus {
    Accepted,
    Rejected,
}

// ============================================================================
// Shared field types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdTagInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id_tag: Option<String>,
    pub status: AuthorizationStatus,
}

impl IdTagInfo {
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            expiry_date: None,
            parent_id_tag: None,
            status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    pub key: String,
    pub readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampledValue {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterValue {
    pub timestamp: DateTime<Utc>,
    pub sampled_value: Vec<SampledValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSchedulePeriod {
    pub start_period: i32,
    pub limit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_phases: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_schedule: Option<DateTime<Utc>>,
    pub charging_rate_unit: ChargingRateUnit,
    pub charging_schedule_period: Vec<ChargingSchedulePeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_charging_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingProfile {
    pub charging_profile_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i32>,
    pub stack_level: i32,
    pub charging_profile_purpose: ChargingProfilePurpose,
    pub charging_profile_kind: ChargingProfileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrency_kind: Option<RecurrencyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    pub charging_schedule: ChargingSchedule,
}

// ============================================================================
// Core profile: charge point to central system
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    pub id_tag: String,
}

impl AuthorizeRequest {
    pub fn new(id_tag: impl Into<String>) -> Self {
        Self {
            id_tag: id_tag.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeConfirmation {
    pub id_tag_info: IdTagInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootNotificationRequest {
    pub charge_point_vendor: String,
    pub charge_point_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_point_serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_box_serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iccid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imsi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_serial_number: Option<String>,
}

impl BootNotificationRequest {
    pub fn new(vendor: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            charge_point_vendor: vendor.into(),
            charge_point_model: model.into(),
            charge_point_serial_number: None,
            charge_box_serial_number: None,
            firmware_version: None,
            iccid: None,
            imsi: None,
            meter_type: None,
            meter_serial_number: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootNotificationConfirmation {
    pub current_time: DateTime<Utc>,
    /// Heartbeat interval in seconds.
    pub interval: i32,
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTransferRequest {
    pub vendor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl DataTransferRequest {
    pub fn new(vendor_id: impl Into<String>) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            message_id: None,
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTransferConfirmation {
    pub status: DataTransferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeartbeatRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatConfirmation {
    pub current_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterValuesRequest {
    pub connector_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i32>,
    pub meter_value: Vec<MeterValue>,
}

impl MeterValuesRequest {
    pub fn new(connector_id: i32, meter_value: Vec<MeterValue>) -> Self {
        Self {
            connector_id,
            transaction_id: None,
            meter_value,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeterValuesConfirmation {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTransactionRequest {
    pub connector_id: i32,
    pub id_tag: String,
    pub meter_start: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

impl StartTransactionRequest {
    pub fn new(connector_id: i32, id_tag: impl Into<String>, meter_start: i32) -> Self {
        Self {
            connector_id,
            id_tag: id_tag.into(),
            meter_start,
            reservation_id: None,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTransactionConfirmation {
    pub id_tag_info: IdTagInfo,
    pub transaction_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusNotificationRequest {
    pub connector_id: i32,
    pub error_code: ChargePointErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    pub status: ChargePointStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_error_code: Option<String>,
}

impl StatusNotificationRequest {
    pub fn new(connector_id: i32, error_code: ChargePointErrorCode, status: ChargePointStatus) -> Self {
        Self {
            connector_id,
            error_code,
            info: None,
            status,
            timestamp: Some(Utc::now()),
            vendor_id: None,
            vendor_error_code: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusNotificationConfirmation {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_tag: Option<String>,
    pub meter_stop: i32,
    pub timestamp: DateTime<Utc>,
    pub transaction_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_data: Option<Vec<MeterValue>>,
}

impl StopTransactionRequest {
    pub fn new(meter_stop: i32, transaction_id: i32) -> Self {
        Self {
            id_tag: None,
            meter_stop,
            timestamp: Utc::now(),
            transaction_id,
            reason: None,
            transaction_data: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTransactionConfirmation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_tag_info: Option<IdTagInfo>,
}

// ============================================================================
// Core profile: central system to charge point
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAvailabilityRequest {
    pub connector_id: i32,
    #[serde(rename = "type")]
    pub availability_type: AvailabilityType,
}

impl ChangeAvailabilityRequest {
    pub fn new(connector_id: i32, availability_type: AvailabilityType) -> Self {
        Self {
            connector_id,
            availability_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAvailabilityConfirmation {
    pub status: AvailabilityStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeConfigurationRequest {
    pub key: String,
    pub value: String,
}

impl ChangeConfigurationRequest {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeConfigurationConfirmation {
    pub status: ConfigurationStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearCacheRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheConfirmation {
    pub status: ClearCacheStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetConfigurationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetConfigurationConfirmation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_key: Option<Vec<KeyValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_key: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStartTransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<i32>,
    pub id_tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_profile: Option<ChargingProfile>,
}

impl RemoteStartTransactionRequest {
    pub fn new(id_tag: impl Into<String>) -> Self {
        Self {
            connector_id: None,
            id_tag: id_tag.into(),
            charging_profile: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStartTransactionConfirmation {
    pub status: RemoteStartStopStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStopTransactionRequest {
    pub transaction_id: i32,
}

impl RemoteStopTransactionRequest {
    pub fn new(transaction_id: i32) -> Self {
        Self { transaction_id }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStopTransactionConfirmation {
    pub status: RemoteStartStopStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    #[serde(rename = "type")]
    pub reset_type: ResetType,
}

impl ResetRequest {
    pub fn new(reset_type: ResetType) -> Self {
        Self { reset_type }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetConfirmation {
    pub status: ResetStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockConnectorRequest {
    pub connector_id: i32,
}

impl UnlockConnectorRequest {
    pub fn new(connector_id: i32) -> Self {
        Self { connector_id }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockConnectorConfirmation {
    pub status: UnlockStatus,
}

// ============================================================================
// SmartCharging profile
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetChargingProfileRequest {
    pub connector_id: i32,
    pub cs_charging_profiles: ChargingProfile,
}

impl SetChargingProfileRequest {
    pub fn new(connector_id: i32, cs_charging_profiles: ChargingProfile) -> Self {
        Self {
            connector_id,
            cs_charging_profiles,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetChargingProfileConfirmation {
    pub status: ChargingProfileStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearChargingProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_profile_purpose: Option<ChargingProfilePurpose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_level: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearChargingProfileConfirmation {
    pub status: ClearChargingProfileStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCompositeScheduleRequest {
    pub connector_id: i32,
    /// Window length in seconds.
    pub duration: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_rate_unit: Option<ChargingRateUnit>,
}

impl GetCompositeScheduleRequest {
    pub fn new(connector_id: i32, duration: i32) -> Self {
        Self {
            connector_id,
            duration,
            charging_rate_unit: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCompositeScheduleConfirmation {
    pub status: GetCompositeScheduleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_schedule: Option<ChargingSchedule>,
}

// ============================================================================
// Reservation profile
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveNowRequest {
    pub connector_id: i32,
    pub expiry_date: DateTime<Utc>,
    pub id_tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id_tag: Option<String>,
    pub reservation_id: i32,
}

impl ReserveNowRequest {
    pub fn new(
        connector_id: i32,
        expiry_date: DateTime<Utc>,
        id_tag: impl Into<String>,
        reservation_id: i32,
    ) -> Self {
        Self {
            connector_id,
            expiry_date,
            id_tag: id_tag.into(),
            parent_id_tag: None,
            reservation_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveNowConfirmation {
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelReservationRequest {
    pub reservation_id: i32,
}

impl CancelReservationRequest {
    pub fn new(reservation_id: i32) -> Self {
        Self { reservation_id }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelReservationConfirmation {
    pub status: CancelReservationStatus,
}

// ============================================================================
// Field validators
// ============================================================================

impl Validate for AuthorizeRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_empty("idTag", &self.id_tag)
            .ci_string("idTag", &self.id_tag, 20)
            .finish()
    }
}

impl Validate for BootNotificationRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_empty("chargePointVendor", &self.charge_point_vendor)
            .ci_string("chargePointVendor", &self.charge_point_vendor, 20)
            .non_empty("chargePointModel", &self.charge_point_model)
            .ci_string("chargePointModel", &self.charge_point_model, 20)
            .opt_ci_string("chargePointSerialNumber", &self.charge_point_serial_number, 25)
            .opt_ci_string("chargeBoxSerialNumber", &self.charge_box_serial_number, 25)
            .opt_ci_string("firmwareVersion", &self.firmware_version, 50)
            .opt_ci_string("iccid", &self.iccid, 20)
            .opt_ci_string("imsi", &self.imsi, 20)
            .opt_ci_string("meterType", &self.meter_type, 25)
            .opt_ci_string("meterSerialNumber", &self.meter_serial_number, 25)
            .finish()
    }
}

impl Validate for DataTransferRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_empty("vendorId", &self.vendor_id)
            .ci_string("vendorId", &self.vendor_id, 255)
            .opt_ci_string("messageId", &self.message_id, 50)
            .finish()
    }
}

impl Validate for MeterValuesRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("connectorId", self.connector_id)
            .finish()
    }
}

impl Validate for StartTransactionRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .positive("connectorId", self.connector_id)
            .non_empty("idTag", &self.id_tag)
            .ci_string("idTag", &self.id_tag, 20)
            .finish()
    }
}

impl Validate for StatusNotificationRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("connectorId", self.connector_id)
            .opt_ci_string("info", &self.info, 50)
            .opt_ci_string("vendorId", &self.vendor_id, 255)
            .opt_ci_string("vendorErrorCode", &self.vendor_error_code, 50)
            .finish()
    }
}

impl Validate for StopTransactionRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .opt_ci_string("idTag", &self.id_tag, 20)
            .finish()
    }
}

impl Validate for ChangeAvailabilityRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("connectorId", self.connector_id)
            .finish()
    }
}

impl Validate for ChangeConfigurationRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_empty("key", &self.key)
            .ci_string("key", &self.key, 50)
            .ci_string("value", &self.value, 500)
            .finish()
    }
}

impl Validate for GetConfigurationRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        let mut constraints = Constraints::new();
        if let Some(keys) = &self.key {
            for key in keys {
                constraints.ci_string("key", key, 50);
            }
        }
        constraints.finish()
    }
}

impl Validate for RemoteStartTransactionRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        let mut constraints = Constraints::new();
        if let Some(connector_id) = self.connector_id {
            constraints.positive("connectorId", connector_id);
        }
        constraints
            .non_empty("idTag", &self.id_tag)
            .ci_string("idTag", &self.id_tag, 20)
            .finish()
    }
}

impl Validate for RemoteStopTransactionRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("transactionId", self.transaction_id)
            .finish()
    }
}

impl Validate for UnlockConnectorRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .positive("connectorId", self.connector_id)
            .finish()
    }
}

impl Validate for SetChargingProfileRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("connectorId", self.connector_id)
            .non_negative("csChargingProfiles.stackLevel", self.cs_charging_profiles.stack_level)
            .finish()
    }
}

impl Validate for GetCompositeScheduleRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("connectorId", self.connector_id)
            .finish()
    }
}

impl Validate for ReserveNowRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("connectorId", self.connector_id)
            .non_empty("idTag", &self.id_tag)
            .ci_string("idTag", &self.id_tag, 20)
            .opt_ci_string("parentIdTag", &self.parent_id_tag, 20)
            .finish()
    }
}

impl Validate for AuthorizeConfirmation {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .opt_ci_string("idTagInfo.parentIdTag", &self.id_tag_info.parent_id_tag, 20)
            .finish()
    }
}

impl Validate for HeartbeatRequest {}
impl Validate for BootNotificationConfirmation {}
impl Validate for DataTransferConfirmation {}
impl Validate for HeartbeatConfirmation {}
impl Validate for MeterValuesConfirmation {}
impl Validate for StartTransactionConfirmation {}
impl Validate for StatusNotificationConfirmation {}
impl Validate for StopTransactionConfirmation {}
impl Validate for ChangeAvailabilityConfirmation {}
impl Validate for ChangeConfigurationConfirmation {}
impl Validate for ClearCacheRequest {}
impl Validate for ClearCacheConfirmation {}
impl Validate for GetConfigurationConfirmation {}
impl Validate for RemoteStartTransactionConfirmation {}
impl Validate for RemoteStopTransactionConfirmation {}
impl Validate for ResetRequest {}
impl Validate for ResetConfirmation {}
impl Validate for UnlockConnectorConfirmation {}
impl Validate for SetChargingProfileConfirmation {}
impl Validate for ClearChargingProfileRequest {}
impl Validate for ClearChargingProfileConfirmation {}
impl Validate for GetCompositeScheduleConfirmation {}
impl Validate for ReserveNowConfirmation {}
impl Validate for CancelReservationRequest {}
impl Validate for CancelReservationConfirmation {}
