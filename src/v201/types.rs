//! OCPP 2.0.1 message types
//!
//! Request/response payloads and shared field types for the 2.0.1 feature
//! set carried by this runtime: provisioning, availability, metering,
//! transactions, remote control, smart charging, reservation and data
//! transfer. Wire format is camelCase with optional fields skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{Constraints, Validate, Violation};

// ============================================================================
// Enumerations
// ============================================================================

/// Connector status reported via StatusNotification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorStatus {
    Available,
    Occupied,
    Reserved,
    Unavailable,
    Faulted,
}

/// Generic accepted/rejected outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenericStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Accepted,
    Pending,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootReason {
    ApplicationReset,
    FirmwareUpdate,
    LocalReset,
    PowerUp,
    RemoteReset,
    ScheduledReset,
    Triggered,
    Unknown,
    Watchdog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    Actual,
    Target,
    MinSet,
    MaxSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GetVariableStatus {
    Accepted,
    Rejected,
    UnknownComponent,
    UnknownVariable,
    NotSupportedAttributeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetVariableStatus {
    Accepted,
    Rejected,
    UnknownComponent,
    UnknownVariable,
    NotSupportedAttributeType,
    RebootRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetKind {
    Immediate,
    OnIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetStatus {
    Accepted,
    Rejected,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionEventKind {
    Started,
    Updated,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerReason {
    Authorized,
    CablePluggedIn,
    ChargingRateChanged,
    ChargingStateChanged,
    Deauthorized,
    EnergyLimitReached,
    #[serde(rename = "EVCommunicationLost")]
    EvCommunicationLost,
    #[serde(rename = "EVConnectTimeout")]
    EvConnectTimeout,
    MeterValueClock,
    MeterValuePeriodic,
    TimeLimitReached,
    Trigger,
    UnlockCommand,
    StopAuthorized,
    #[serde(rename = "EVDeparted")]
    EvDeparted,
    #[serde(rename = "EVDetected")]
    EvDetected,
    RemoteStop,
    RemoteStart,
    AbnormalCondition,
    SignedDataReceived,
    ResetCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingState {
    Charging,
    #[serde(rename = "EVConnected")]
    EvConnected,
    SuspendedEV,
    SuspendedEVSE,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingProfilePurpose {
    ChargingStationExternalConstraints,
    ChargingStationMaxProfile,
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
pub enum ReservationStatus {
    Accepted,
    Faulted,
    Occupied,
    Rejected,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataTransferStatus {
    Accepted,
    Rejected,
    UnknownMessageId,
    UnknownVendorId,
}

/// Measurand of a sampled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Measurand {
    #[serde(rename = "Current.Import")]
    CurrentImport,
    #[serde(rename = "Current.Export")]
    CurrentExport,
    #[serde(rename = "Energy.Active.Import.Register")]
    EnergyActiveImportRegister,
    #[serde(rename = "Energy.Active.Export.Register")]
    EnergyActiveExportRegister,
    #[serde(rename = "Power.Active.Import")]
    PowerActiveImport,
    #[serde(rename = "Power.Active.Export")]
    PowerActiveExport,
    #[serde(rename = "Voltage")]
    Voltage,
    #[serde(rename = "SoC")]
    SoC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingContext {
    #[serde(rename = "Interruption.Begin")]
    InterruptionBegin,
    #[serde(rename = "Interruption.End")]
    InterruptionEnd,
    #[serde(rename = "Sample.Clock")]
    SampleClock,
    #[serde(rename = "Sample.Periodic")]
    SamplePeriodic,
    #[serde(rename = "Transaction.Begin")]
    TransactionBegin,
    #[serde(rename = "Transaction.End")]
    TransactionEnd,
    Trigger,
}

// ============================================================================
// Complex types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub reason_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evse {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdToken {
    pub id_token: String,
    #[serde(rename = "type")]
    pub token_type: String,
}

impl IdToken {
    pub fn new(id_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
            token_type: token_type.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evse: Option<Evse>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance: None,
            evse: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingStationInfo {
    pub model: String,
    pub vendor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampledValue {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ReadingContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurand: Option<Measurand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_to_use: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSchedule {
    pub id: i32,
    pub charging_rate_unit: ChargingRateUnit,
    pub charging_schedule_period: Vec<ChargingSchedulePeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_schedule: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_charging_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingProfile {
    pub id: i32,
    pub stack_level: i32,
    pub charging_profile_purpose: ChargingProfilePurpose,
    pub charging_profile_kind: ChargingProfileKind,
    pub charging_schedule: Vec<ChargingSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrency_kind: Option<RecurrencyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_state: Option<ChargingState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_start_id: Option<i32>,
}

// ============================================================================
// Provisioning
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootNotificationRequest {
    pub charging_station: ChargingStationInfo,
    pub reason: BootReason,
}

impl BootNotificationRequest {
    pub fn new(charging_station: ChargingStationInfo, reason: BootReason) -> Self {
        Self {
            charging_station,
            reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootNotificationResponse {
    pub current_time: DateTime<Utc>,
    /// Heartbeat interval in seconds.
    pub interval: i32,
    pub status: RegistrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVariableData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<AttributeType>,
    pub component: Component,
    pub variable: Variable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVariablesRequest {
    pub get_variable_data: Vec<GetVariableData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVariableResult {
    pub attribute_status: GetVariableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<AttributeType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_value: Option<String>,
    pub component: Component,
    pub variable: Variable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVariablesResponse {
    pub get_variable_result: Vec<GetVariableResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVariableData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<AttributeType>,
    pub attribute_value: String,
    pub component: Component,
    pub variable: Variable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVariablesRequest {
    pub set_variable_data: Vec<SetVariableData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVariableResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<AttributeType>,
    pub attribute_status: SetVariableStatus,
    pub component: Component,
    pub variable: Variable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVariablesResponse {
    pub set_variable_result: Vec<SetVariableResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    #[serde(rename = "type")]
    pub kind: ResetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evse_id: Option<i32>,
}

impl ResetRequest {
    pub fn new(kind: ResetKind) -> Self {
        Self {
            kind,
            evse_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub status: ResetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
}

// ============================================================================
// Availability
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeartbeatRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatResponse {
    pub current_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusNotificationRequest {
    pub timestamp: DateTime<Utc>,
    pub connector_status: ConnectorStatus,
    pub evse_id: i32,
    pub connector_id: i32,
}

impl StatusNotificationRequest {
    pub fn new(evse_id: i32, connector_id: i32, connector_status: ConnectorStatus) -> Self {
        Self {
            timestamp: Utc::now(),
            connector_status,
            evse_id,
            connector_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusNotificationResponse {}

// ============================================================================
// Metering
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterValuesRequest {
    pub evse_id: i32,
    pub meter_value: Vec<MeterValue>,
}

impl MeterValuesRequest {
    pub fn new(evse_id: i32, meter_value: Vec<MeterValue>) -> Self {
        Self {
            evse_id,
            meter_value,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeterValuesResponse {}

// ============================================================================
// Transactions
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEventRequest {
    pub event_type: TransactionEventKind,
    pub timestamp: DateTime<Utc>,
    pub trigger_reason: TriggerReason,
    pub seq_no: i32,
    pub transaction_info: Transaction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evse: Option<Evse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<IdToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_value: Option<Vec<MeterValue>>,
}

impl TransactionEventRequest {
    pub fn new(
        event_type: TransactionEventKind,
        trigger_reason: TriggerReason,
        seq_no: i32,
        transaction_info: Transaction,
    ) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            trigger_reason,
            seq_no,
            transaction_info,
            evse: None,
            id_token: None,
            meter_value: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEventResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_priority: Option<i32>,
}

// ============================================================================
// Remote control
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStartTransactionRequest {
    pub id_token: IdToken,
    pub remote_start_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evse_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_profile: Option<ChargingProfile>,
}

impl RequestStartTransactionRequest {
    pub fn new(id_token: IdToken, remote_start_id: i32) -> Self {
        Self {
            id_token,
            remote_start_id,
            evse_id: None,
            charging_profile: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStartTransactionResponse {
    pub status: GenericStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStopTransactionRequest {
    pub transaction_id: String,
}

impl RequestStopTransactionRequest {
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStopTransactionResponse {
    pub status: GenericStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
}

// ============================================================================
// Smart charging
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetChargingProfileRequest {
    pub evse_id: i32,
    pub charging_profile: ChargingProfile,
}

impl SetChargingProfileRequest {
    pub fn new(evse_id: i32, charging_profile: ChargingProfile) -> Self {
        Self {
            evse_id,
            charging_profile,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetChargingProfileResponse {
    pub status: GenericStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
}

// ============================================================================
// Reservation
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveNowRequest {
    pub id: i32,
    pub expiry_date_time: DateTime<Utc>,
    pub id_token: IdToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evse_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_type: Option<String>,
}

impl ReserveNowRequest {
    pub fn new(id: i32, expiry_date_time: DateTime<Utc>, id_token: IdToken) -> Self {
        Self {
            id,
            expiry_date_time,
            id_token,
            evse_id: None,
            connector_type: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveNowResponse {
    pub status: ReservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
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
pub struct CancelReservationResponse {
    pub status: GenericStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
}

// ============================================================================
// Data transfer
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTransferRequest {
    pub vendor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
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
pub struct DataTransferResponse {
    pub status: DataTransferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
}

// ============================================================================
// Field validators
// ============================================================================

impl Validate for BootNotificationRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_empty("chargingStation.model", &self.charging_station.model)
            .ci_string("chargingStation.model", &self.charging_station.model, 20)
            .non_empty("chargingStation.vendorName", &self.charging_station.vendor_name)
            .ci_string("chargingStation.vendorName", &self.charging_station.vendor_name, 50)
            .opt_ci_string(
                "chargingStation.serialNumber",
                &self.charging_station.serial_number,
                25,
            )
            .opt_ci_string(
                "chargingStation.firmwareVersion",
                &self.charging_station.firmware_version,
                50,
            )
            .finish()
    }
}

impl Validate for GetVariablesRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        let mut constraints = Constraints::new();
        if self.get_variable_data.is_empty() {
            constraints.non_empty("getVariableData", "");
        }
        for data in &self.get_variable_data {
            constraints.ci_string("component.name", &data.component.name, 50);
            constraints.ci_string("variable.name", &data.variable.name, 50);
        }
        constraints.finish()
    }
}

impl Validate for SetVariablesRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        let mut constraints = Constraints::new();
        if self.set_variable_data.is_empty() {
            constraints.non_empty("setVariableData", "");
        }
        for data in &self.set_variable_data {
            constraints.ci_string("attributeValue", &data.attribute_value, 1000);
            constraints.ci_string("component.name", &data.component.name, 50);
            constraints.ci_string("variable.name", &data.variable.name, 50);
        }
        constraints.finish()
    }
}

impl Validate for StatusNotificationRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("evseId", self.evse_id)
            .non_negative("connectorId", self.connector_id)
            .finish()
    }
}

impl Validate for MeterValuesRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("evseId", self.evse_id)
            .finish()
    }
}

impl Validate for TransactionEventRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("seqNo", self.seq_no)
            .non_empty(
                "transactionInfo.transactionId",
                &self.transaction_info.transaction_id,
            )
            .ci_string(
                "transactionInfo.transactionId",
                &self.transaction_info.transaction_id,
                36,
            )
            .finish()
    }
}

impl Validate for RequestStartTransactionRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_empty("idToken.idToken", &self.id_token.id_token)
            .ci_string("idToken.idToken", &self.id_token.id_token, 36)
            .finish()
    }
}

impl Validate for RequestStopTransactionRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_empty("transactionId", &self.transaction_id)
            .ci_string("transactionId", &self.transaction_id, 36)
            .finish()
    }
}

impl Validate for SetChargingProfileRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("evseId", self.evse_id)
            .non_negative("chargingProfile.stackLevel", self.charging_profile.stack_level)
            .finish()
    }
}

impl Validate for ReserveNowRequest {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Constraints::new()
            .non_negative("id", self.id)
            .non_empty("idToken.idToken", &self.id_token.id_token)
            .ci_string("idToken.idToken", &self.id_token.id_token, 36)
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

impl Validate for BootNotificationResponse {}
impl Validate for GetVariablesResponse {}
impl Validate for SetVariablesResponse {}
impl Validate for ResetRequest {}
impl Validate for ResetResponse {}
impl Validate for HeartbeatRequest {}
impl Validate for HeartbeatResponse {}
impl Validate for StatusNotificationResponse {}
impl Validate for MeterValuesResponse {}
impl Validate for TransactionEventResponse {}
impl Validate for RequestStartTransactionResponse {}
impl Validate for RequestStopTransactionResponse {}
impl Validate for SetChargingProfileResponse {}
impl Validate for ReserveNowResponse {}
impl Validate for CancelReservationRequest {}
impl Validate for CancelReservationResponse {}
impl Validate for DataTransferResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_notification_roundtrip() {
        let request = BootNotificationRequest::new(
            ChargingStationInfo {
                model: "EK3".to_string(),
                vendor_name: "Elektrokombinacija".to_string(),
                serial_number: Some("EK3-001".to_string()),
                firmware_version: Some("0.1.0".to_string()),
            },
            BootReason::PowerUp,
        );

        let json = serde_json::to_string(&request).unwrap();
        let parsed: BootNotificationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.charging_station.model, "EK3");
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn reset_type_field_renames() {
        let json = serde_json::to_string(&ResetRequest::new(ResetKind::OnIdle)).unwrap();
        assert_eq!(json, r#"{"type":"OnIdle"}"#);
    }

    #[test]
    fn set_variables_rejects_oversized_value() {
        let request = SetVariablesRequest {
            set_variable_data: vec![SetVariableData {
                attribute_type: None,
                attribute_value: "x".repeat(1001),
                component: Component::new("OCPPCommCtrlr"),
                variable: Variable::new("HeartbeatInterval"),
            }],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn transaction_event_requires_transaction_id() {
        let request = TransactionEventRequest::new(
            TransactionEventKind::Started,
            TriggerReason::Authorized,
            0,
            Transaction {
                transaction_id: String::new(),
                charging_state: None,
                remote_start_id: None,
            },
        );
        assert!(request.validate().is_err());
    }

    #[test]
    fn measurand_serializes_dotted_names() {
        let json = serde_json::to_string(&Measurand::EnergyActiveImportRegister).unwrap();
        assert_eq!(json, "\"Energy.Active.Import.Register\"");
    }
}
