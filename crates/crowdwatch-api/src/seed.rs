//! Built-in seed data loaded by [`MetricsStore::initialize`](crate::store::MetricsStore::initialize).
//!
//! Four venue zones with one sample each (two for the concourse, which forms a
//! short time series) and three staffing recommendations. Timestamps are
//! relative to the moment the store is initialized.

use crowdwatch_types::{Priority, Recommendation, RecommendationId, ZoneId, ZoneIdError, ZoneMetric};

/// Seed zone metrics as `(zone, people_count, density, trend, seconds_ago)`.
const SEED_METRICS: &[(&str, u32, f64, f64, i64)] = &[
    ("zone-entrance-1", 42, 0.028, 0.15, 0),
    ("zone-concourse-a", 96, 0.077, 0.21, 60),
    ("zone-concourse-a", 118, 0.094, 0.32, 0),
    ("zone-food-court", 203, 0.161, -0.08, 0),
    ("zone-gate-b", 67, 0.045, 0.05, 0),
];

/// Build the seed zone metrics.
pub fn seed_metrics(now: i64) -> Result<Vec<ZoneMetric>, ZoneIdError> {
    SEED_METRICS
        .iter()
        .map(
            |&(zone, people_count, density, trend, seconds_ago)| -> Result<ZoneMetric, ZoneIdError> {
                Ok(ZoneMetric {
                    zone_id: ZoneId::parse(zone)?,
                    people_count,
                    density,
                    trend,
                    timestamp: now.saturating_sub(seconds_ago),
                })
            },
        )
        .collect()
}

/// Build the seed staffing recommendations.
pub fn seed_recommendations(now: i64) -> Result<Vec<Recommendation>, ZoneIdError> {
    Ok(vec![
        Recommendation {
            id: RecommendationId::new("rec-001"),
            zone_id: ZoneId::parse("zone-food-court")?,
            kind: String::from("reroute_staff"),
            priority: Priority::High,
            message: String::from(
                "Density above threshold: move 3 stewards from Gate B to the food court",
            ),
            people_count: 203,
            threshold: 0.15,
            trend: -0.08,
            density: 0.161,
            staff_count: 3,
            timestamp: now,
        },
        Recommendation {
            id: RecommendationId::new("rec-002"),
            zone_id: ZoneId::parse("zone-concourse-a")?,
            kind: String::from("open_overflow"),
            priority: Priority::Medium,
            message: String::from("Concourse A is filling quickly: prepare the overflow lane"),
            people_count: 118,
            threshold: 0.1,
            trend: 0.32,
            density: 0.094,
            staff_count: 2,
            timestamp: now,
        },
        Recommendation {
            id: RecommendationId::new("rec-003"),
            zone_id: ZoneId::parse("zone-entrance-1")?,
            kind: String::from("monitor"),
            priority: Priority::Low,
            message: String::from("Entrance 1 within normal range"),
            people_count: 42,
            threshold: 0.05,
            trend: 0.15,
            density: 0.028,
            staff_count: 0,
            timestamp: now,
        },
    ])
}
