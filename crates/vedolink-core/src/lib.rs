//! Polling and reconciliation engine for Comelit VEDO alarm controllers.
//!
//! This crate mirrors a remote alarm controller into locally held,
//! observable entities:
//!
//! - **[`Platform`]**: startup ordering. Validates configuration,
//!   [`discover()`](Platform::discover)s the alarm and zone entities once,
//!   then [`start()`](Platform::start)s polling when the host is ready.
//!
//! - **[`ReconciliationLoop`]**: self-rescheduling poll. Each tick reads
//!   area state, then zone state, and applies both onto the registry. The
//!   next tick is armed only after the current one finishes, and failures
//!   are logged without stopping the loop.
//!
//! - **[`EntityRegistry`]**: the fixed set of entities built at discovery,
//!   zones keyed by their description on the controller.
//!
//! - **[`RemoteStateClient`]**: the async seam to the controller;
//!   implemented for [`vedolink_api::VedoClient`].

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod platform;
pub mod reconcile;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{RemoteStateClient, build_vedo_client};
pub use config::{AreaMapping, ClientOptions, PlatformConfig};
pub use error::CoreError;
pub use platform::Platform;
pub use reconcile::{LoopStatus, ReconcileHandle, ReconciliationLoop, TickReport};
pub use store::{Entity, EntityRegistry, ZoneApplyOutcome};
pub use stream::EntityStream;

pub use model::{
    ALARM_ENTITY_NAME, AlarmEntity, AlarmMode, AlarmSnapshot, AreaFlags, AreaState, ZoneEntity,
    ZoneSnapshot, ZoneState, ZoneStatus,
};

#[cfg(any(test, feature = "test-utils"))]
pub use client::mock::{Call, MockStateClient, Reply};
