//! Shared type definitions for the Crowdwatch telemetry API.
//!
//! This crate is the single source of truth for the entities served by the
//! API: per-zone crowd metrics and staffing recommendations.
//!
//! # Modules
//!
//! - [`ids`] -- String identifier newtypes for zones and recommendations
//! - [`enums`] -- Enumeration types (recommendation priority)
//! - [`structs`] -- Core entity structs (`ZoneMetric`, `Recommendation`)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::Priority;
pub use ids::{RecommendationId, ZoneId, ZoneIdError, MAX_ZONE_ID_LEN};
pub use structs::{Recommendation, ZoneMetric, MAX_MESSAGE_LEN};
