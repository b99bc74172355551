//! Core entity structs served by the Crowdwatch API.
//!
//! Both entities are immutable once created. A zone may have several
//! [`ZoneMetric`] entries forming a time series; lookups return them in
//! insertion order.

use serde::{Deserialize, Serialize};

use crate::enums::Priority;
use crate::ids::{RecommendationId, ZoneId};

/// Maximum length of a recommendation message in bytes.
pub const MAX_MESSAGE_LEN: usize = 255;

// ---------------------------------------------------------------------------
// ZoneMetric
// ---------------------------------------------------------------------------

/// One crowd-density sample for a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMetric {
    /// The zone this sample belongs to.
    pub zone_id: ZoneId,
    /// Number of people counted in the zone.
    pub people_count: u32,
    /// People per unit area. Never negative.
    pub density: f64,
    /// Signed rate of change of the density.
    pub trend: f64,
    /// Sample time in seconds since the Unix epoch.
    pub timestamp: i64,
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// A staffing action suggested for a zone.
///
/// `zone_id` refers to a zone by id but the reference is not enforced; a
/// recommendation may name a zone with no metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Unique recommendation id.
    pub id: RecommendationId,
    /// Zone the recommendation applies to.
    pub zone_id: ZoneId,
    /// Action category, e.g. `reroute_staff`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Urgency.
    pub priority: Priority,
    /// Human-readable explanation, at most [`MAX_MESSAGE_LEN`] bytes.
    pub message: String,
    /// People counted when the recommendation was produced.
    pub people_count: u32,
    /// Density threshold that triggered the recommendation.
    pub threshold: f64,
    /// Density trend at the time of the recommendation.
    pub trend: f64,
    /// Density at the time of the recommendation.
    pub density: f64,
    /// Number of staff the action involves.
    pub staff_count: u32,
    /// Creation time in seconds since the Unix epoch.
    pub timestamp: i64,
}
