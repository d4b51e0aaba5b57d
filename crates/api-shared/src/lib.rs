//! # API Shared
//!
//! Shared definitions for the ward API.
//!
//! Contains:
//! - JSON wire types (`wire` module) exchanged between the board client and the ward API
//! - Route paths used by both sides
//! - Shared services like `HealthService`
//!
//! Used by `ward-core`, `ward-client` and `api-rest`.

pub mod health;
pub mod routes;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
