//! JSON body rendering for every endpoint.
//!
//! The field order and numeric precision of each body are part of the wire
//! contract, so bodies are assembled field by field rather than derived from
//! the entity structs. All string values pass through [`escape`]; floats use
//! fixed precision (`density` 3dp, `trend` 2dp, `threshold` 1dp).

use crowdwatch_types::{Recommendation, ZoneId, ZoneMetric};

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "api-server";

/// Service version reported by the health endpoint.
pub const SERVICE_VERSION: &str = "1.0.0";

/// Body of every `404 Not Found` response.
pub const NOT_FOUND_BODY: &str =
    r#"{"error":"Not Found","message":"The requested endpoint does not exist"}"#;

/// Body of every `400 Bad Request` response.
pub const BAD_REQUEST_BODY: &str = r#"{"error":"Bad Request","message":"Malformed request line"}"#;

/// Static 2x2 heatmap sample served by `/api/v1/heatmap`.
const HEATMAP_TILES: &str = concat!(
    r#"[{"x":0,"y":0,"zone_id":"zone-entrance-1","intensity":0.25},"#,
    r#"{"x":1,"y":0,"zone_id":"zone-concourse-a","intensity":0.60},"#,
    r#"{"x":0,"y":1,"zone_id":"zone-food-court","intensity":0.85},"#,
    r#"{"x":1,"y":1,"zone_id":"zone-gate-b","intensity":0.40}]"#,
);

/// Render a string as a quoted, escaped JSON string literal.
pub fn escape(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

/// `{"status":"healthy","service":"api-server","version":"1.0.0","timestamp":<t>}`
pub fn health(timestamp: i64) -> String {
    format!(
        r#"{{"status":"healthy","service":"{SERVICE_NAME}","version":"{SERVICE_VERSION}","timestamp":{timestamp}}}"#
    )
}

/// Render the metric time series of one zone.
pub fn zone_metrics(zone_id: &ZoneId, metrics: &[ZoneMetric]) -> String {
    let samples: Vec<String> = metrics.iter().map(metric_sample).collect();
    format!(
        r#"{{"zone_id":{},"metrics":[{}]}}"#,
        escape(zone_id.as_str()),
        samples.join(",")
    )
}

fn metric_sample(metric: &ZoneMetric) -> String {
    format!(
        r#"{{"timestamp":{},"people_count":{},"density":{:.3},"trend":{:.2}}}"#,
        metric.timestamp, metric.people_count, metric.density, metric.trend
    )
}

/// Render the static heatmap sample stamped with `timestamp`.
pub fn heatmap(timestamp: i64) -> String {
    format!(r#"{{"heatmap":{HEATMAP_TILES},"timestamp":{timestamp}}}"#)
}

/// Render the recommendations array.
pub fn recommendations(recommendations: &[Recommendation]) -> String {
    let items: Vec<String> = recommendations.iter().map(recommendation).collect();
    format!("[{}]", items.join(","))
}

fn recommendation(rec: &Recommendation) -> String {
    format!(
        concat!(
            r#"{{"id":{},"zone_id":{},"type":{},"priority":"{}","message":{},"#,
            r#""timestamp":{},"people_count":{},"threshold":{:.1},"trend":{:.2},"#,
            r#""density":{:.3},"staff_count":{}}}"#,
        ),
        escape(rec.id.as_str()),
        escape(rec.zone_id.as_str()),
        escape(&rec.kind),
        rec.priority.as_str(),
        escape(&rec.message),
        rec.timestamp,
        rec.people_count,
        rec.threshold,
        rec.trend,
        rec.density,
        rec.staff_count,
    )
}
