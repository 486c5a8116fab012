//! # ocppj
//!
//! OCPP-J messaging runtime: the JSON-over-WebSocket binding of the Open
//! Charge Point Protocol, for both wire versions (1.6J and 2.0.1) and both
//! ends of the link.
//!
//! ## Architecture
//!
//! ```text
//!                      bytes (WebSocket text frames)
//!                                 │
//!                                 ▼
//! ┌───────────────────────────────────────────────────────┐
//! │                      Session                          │
//! │  ┌────────────┐  ┌───────────────┐  ┌─────────────┐   │
//! │  │ Wire Codec │  │ Pending Calls │  │  Registry   │   │
//! │  │  [2|3|4]   │  │ oneshot sinks │  │ action→desc │   │
//! │  └────────────┘  └───────────────┘  └─────────────┘   │
//! └───────────────────────────┬───────────────────────────┘
//!                             │ profile routes
//!                             ▼
//! ┌───────────────────────────────────────────────────────┐
//! │   Facades: v16::{ChargePoint, CentralSystem}          │
//! │            v201::{ChargingStation, Csms}              │
//! └───────────────────────────┬───────────────────────────┘
//!                             ▼
//!                         user code
//! ```
//!
//! The [`session::Session`] owns the link and enforces the OCPP rule of at
//! most one outstanding CALL per endpoint: a second concurrent call fails
//! fast with [`error::CallFailure::Busy`] instead of queueing. Replies are
//! correlated by message id through a one-shot sink per pending call, so a
//! stray or late reply can never satisfy the wrong waiter.
//!
//! ## Usage
//!
//! ```no_run
//! use ocppj::v16::ChargePoint;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let charge_point = ChargePoint::new("EK3-001");
//!     charge_point.start("ws://localhost:8180/ocpp").await?;
//!
//!     let confirmation = charge_point
//!         .boot_notification("Elektrokombinacija", "EK3-OCPP", |req| {
//!             req.firmware_version = Some("0.1.0".into());
//!         })
//!         .await?;
//!     println!("registered: {:?}", confirmation.status);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod observer;
pub mod pending;
pub mod registry;
pub mod session;
pub mod transport;
pub mod v16;
pub mod v201;
pub mod validation;

pub use config::SessionConfig;
pub use error::{CallFailure, ErrorCode, HandlerFault, RegistryConflict, TransportError};
pub use frame::{Call, CallError, CallResult, Frame, WireCodec};
pub use observer::{ProtocolObserver, TracingObserver};
pub use registry::{Direction, FeatureDescriptor, FeatureRegistry, ProtocolVersion, Role};
pub use session::{ProfileRoute, Session};
pub use validation::{Validate, Violation};
