//! Path routing for the Crowdwatch API.
//!
//! Routes are matched exactly and case-sensitively. Only the zone id segment
//! of `/api/v1/zone/{id}/metrics` is variable. Paths are not normalized:
//! a trailing slash or a query string makes a path unroutable.
//!
//! | Path | Route |
//! |------|-------|
//! | `/api/v1/health` | [`Route::Health`] |
//! | `/api/v1/zone/{id}/metrics` | [`Route::ZoneMetrics`] |
//! | `/api/v1/heatmap` | [`Route::Heatmap`] |
//! | `/api/v1/recommendations` | [`Route::Recommendations`] |
//! | anything else | [`Route::NotFound`] |

use crowdwatch_types::ZoneId;

/// Health check path.
pub const HEALTH_PATH: &str = "/api/v1/health";

/// Heatmap path.
pub const HEATMAP_PATH: &str = "/api/v1/heatmap";

/// Recommendations path.
pub const RECOMMENDATIONS_PATH: &str = "/api/v1/recommendations";

/// Prefix of the zone metrics path.
pub const ZONE_PREFIX: &str = "/api/v1/zone/";

/// Suffix of the zone metrics path.
pub const ZONE_METRICS_SUFFIX: &str = "/metrics";

/// Every endpoint as `(method, path pattern)`, for the startup banner.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", HEALTH_PATH),
    ("GET", "/api/v1/zone/{id}/metrics"),
    ("GET", HEATMAP_PATH),
    ("GET", RECOMMENDATIONS_PATH),
];

/// The handler a request path resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Service health.
    Health,
    /// Metric time series of one zone.
    ZoneMetrics(ZoneId),
    /// Static heatmap sample.
    Heatmap,
    /// All recommendations.
    Recommendations,
    /// No endpoint matches.
    NotFound,
}

/// Resolve a request path to a [`Route`].
///
/// A zone segment that is not a valid [`ZoneId`] (empty, too long, or
/// containing `/`) resolves to [`Route::NotFound`].
pub fn resolve(path: &str) -> Route {
    match path {
        HEALTH_PATH => Route::Health,
        HEATMAP_PATH => Route::Heatmap,
        RECOMMENDATIONS_PATH => Route::Recommendations,
        _ => zone_metrics_route(path).unwrap_or(Route::NotFound),
    }
}

fn zone_metrics_route(path: &str) -> Option<Route> {
    let zone = path
        .strip_prefix(ZONE_PREFIX)?
        .strip_suffix(ZONE_METRICS_SUFFIX)?;
    ZoneId::parse(zone).ok().map(Route::ZoneMetrics)
}
