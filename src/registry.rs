//! Feature registry
//!
//! Maps an action name to its [`FeatureDescriptor`]: profile, direction and
//! the request/response payload shapes. Registries for 1.6 and 2.0.1 are
//! built independently (see [`crate::v16::registry`] and
//! [`crate::v201::registry`]); a session binds to exactly one and never
//! mutates it afterwards.
//!
//! Shapes are explicit tokens: each carries a monomorphized check function
//! that deserializes the raw JSON into the concrete payload struct and runs
//! its field validator. No runtime type inspection is involved.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RegistryConflict;
use crate::validation::{describe, Validate, Violation};

/// Wire protocol version a registry (and its sessions) speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    V16,
    V201,
}

impl ProtocolVersion {
    /// WebSocket subprotocol token offered at the handshake.
    pub fn subprotocol(&self) -> &'static str {
        match self {
            ProtocolVersion::V16 => "ocpp1.6",
            ProtocolVersion::V201 => "ocpp2.0.1",
        }
    }
}

/// Which endpoint may initiate a feature's CALL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    CsmsToStation,
    StationToCsms,
    Both,
}

/// The role a session plays on its end of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    ChargingStation,
    Csms,
}

impl Direction {
    pub fn sendable_by(&self, role: Role) -> bool {
        match (self, role) {
            (Direction::Both, _) => true,
            (Direction::CsmsToStation, Role::Csms) => true,
            (Direction::StationToCsms, Role::ChargingStation) => true,
            _ => false,
        }
    }

    pub fn receivable_by(&self, role: Role) -> bool {
        match (self, role) {
            (Direction::Both, _) => true,
            (Direction::CsmsToStation, Role::ChargingStation) => true,
            (Direction::StationToCsms, Role::Csms) => true,
            _ => false,
        }
    }
}

/// Why a payload was rejected by its shape token.
#[derive(Debug, Clone)]
pub enum PayloadFault {
    /// The JSON does not deserialize into the registered struct.
    Shape(String),
    /// The struct deserialized but violated field constraints.
    Constraints(Vec<Violation>),
}

impl std::fmt::Display for PayloadFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadFault::Shape(msg) => write!(f, "payload shape mismatch: {}", msg),
            PayloadFault::Constraints(violations) => {
                write!(f, "constraint violation: {}", describe(violations))
            }
        }
    }
}

/// Explicit shape token: checks that a raw payload deserializes into the
/// concrete request/response struct and satisfies its validator.
#[derive(Clone, Copy)]
pub struct PayloadShape {
    check: fn(&Value) -> Result<(), PayloadFault>,
}

fn check_as<T: DeserializeOwned + Validate>(payload: &Value) -> Result<(), PayloadFault> {
    let typed: T = serde_json::from_value(payload.clone())
        .map_err(|e| PayloadFault::Shape(e.to_string()))?;
    typed.validate().map_err(PayloadFault::Constraints)
}

impl PayloadShape {
    pub fn of<T: DeserializeOwned + Validate>() -> Self {
        Self {
            check: check_as::<T>,
        }
    }

    pub fn check(&self, payload: &Value) -> Result<(), PayloadFault> {
        (self.check)(payload)
    }
}

impl PartialEq for PayloadShape {
    fn eq(&self, other: &Self) -> bool {
        self.check as usize == other.check as usize
    }
}

impl std::fmt::Debug for PayloadShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PayloadShape")
    }
}

/// Immutable description of one feature. Created at registry
/// initialization, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureDescriptor {
    pub action: &'static str,
    pub profile: &'static str,
    pub version: ProtocolVersion,
    pub direction: Direction,
    pub request: PayloadShape,
    pub response: PayloadShape,
}

impl FeatureDescriptor {
    pub fn new<Req, Resp>(
        action: &'static str,
        profile: &'static str,
        version: ProtocolVersion,
        direction: Direction,
    ) -> Self
    where
        Req: DeserializeOwned + Validate,
        Resp: DeserializeOwned + Validate,
    {
        Self {
            action,
            profile,
            version,
            direction,
            request: PayloadShape::of::<Req>(),
            response: PayloadShape::of::<Resp>(),
        }
    }
}

/// Registry of the features one protocol version supports.
#[derive(Debug)]
pub struct FeatureRegistry {
    version: ProtocolVersion,
    features: HashMap<&'static str, FeatureDescriptor>,
}

impl FeatureRegistry {
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            features: HashMap::new(),
        }
    }

    /// Idempotent insertion. Re-registering an identical descriptor is a
    /// no-op; a colliding descriptor with a different shape, profile or
    /// direction fails.
    pub fn register(&mut self, descriptor: FeatureDescriptor) -> Result<(), RegistryConflict> {
        match self.features.get(descriptor.action) {
            None => {
                self.features.insert(descriptor.action, descriptor);
                Ok(())
            }
            Some(existing) if *existing == descriptor => Ok(()),
            Some(_) => Err(RegistryConflict {
                action: descriptor.action,
            }),
        }
    }

    pub fn lookup(&self, action: &str) -> Option<&FeatureDescriptor> {
        self.features.get(action)
    }

    pub fn profile_for(&self, action: &str) -> Option<&'static str> {
        self.features.get(action).map(|d| d.profile)
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn actions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.features.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct PingRequest {}
    impl Validate for PingRequest {}

    #[derive(Deserialize)]
    struct PingResponse {}
    impl Validate for PingResponse {}

    #[derive(Deserialize)]
    struct OtherRequest {
        #[allow(dead_code)]
        id: i32,
    }
    impl Validate for OtherRequest {}

    fn ping() -> FeatureDescriptor {
        FeatureDescriptor::new::<PingRequest, PingResponse>(
            "Ping",
            "Core",
            ProtocolVersion::V16,
            Direction::Both,
        )
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = FeatureRegistry::new(ProtocolVersion::V16);
        registry.register(ping()).unwrap();
        registry.register(ping()).unwrap();
        assert!(registry.lookup("Ping").is_some());
        assert_eq!(registry.profile_for("Ping"), Some("Core"));
    }

    #[test]
    fn conflicting_shape_is_rejected() {
        let mut registry = FeatureRegistry::new(ProtocolVersion::V16);
        registry.register(ping()).unwrap();

        let conflicting = FeatureDescriptor::new::<OtherRequest, PingResponse>(
            "Ping",
            "Core",
            ProtocolVersion::V16,
            Direction::Both,
        );
        let err = registry.register(conflicting).unwrap_err();
        assert_eq!(err.action, "Ping");
    }

    #[test]
    fn direction_rules() {
        assert!(Direction::CsmsToStation.sendable_by(Role::Csms));
        assert!(!Direction::CsmsToStation.sendable_by(Role::ChargingStation));
        assert!(Direction::CsmsToStation.receivable_by(Role::ChargingStation));
        assert!(!Direction::CsmsToStation.receivable_by(Role::Csms));
        assert!(Direction::Both.sendable_by(Role::Csms));
        assert!(Direction::Both.receivable_by(Role::ChargingStation));
    }

    #[test]
    fn shape_check_rejects_wrong_payload() {
        let desc = FeatureDescriptor::new::<OtherRequest, PingResponse>(
            "Other",
            "Core",
            ProtocolVersion::V16,
            Direction::Both,
        );
        assert!(desc
            .request
            .check(&serde_json::json!({"id": 3}))
            .is_ok());
        assert!(matches!(
            desc.request.check(&serde_json::json!({"id": "nope"})),
            Err(PayloadFault::Shape(_))
        ));
    }
}
