// vedolink-api: Async Rust client for the Comelit VEDO alarm controller

pub mod areas;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;
pub mod types;
pub mod zones;

pub use client::{Endpoints, VedoClient};
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{AreaFlags, AreaState, ZoneState, ZoneStatus};
