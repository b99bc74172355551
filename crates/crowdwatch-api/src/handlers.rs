//! Endpoint handlers.
//!
//! Each handler reads what it needs from the [`MetricsStore`] (copying it out
//! under the store lock), renders the body with [`crate::json`], and returns a
//! complete [`Response`]. Handlers never fail: an unknown zone is a valid
//! empty result, not an error.

use crowdwatch_types::ZoneId;

use crate::json;
use crate::response::Response;
use crate::router::Route;
use crate::store::MetricsStore;

/// Run the handler for `route`.
pub async fn handle(route: Route, store: &MetricsStore) -> Response {
    match route {
        Route::Health => health(),
        Route::ZoneMetrics(zone_id) => zone_metrics(store, &zone_id).await,
        Route::Heatmap => heatmap(),
        Route::Recommendations => recommendations(store).await,
        Route::NotFound => Response::not_found(),
    }
}

/// `GET /api/v1/health`
pub fn health() -> Response {
    Response::ok(json::health(now()))
}

/// `GET /api/v1/zone/{id}/metrics`
pub async fn zone_metrics(store: &MetricsStore, zone_id: &ZoneId) -> Response {
    let metrics = store.metrics_for_zone(zone_id).await;
    Response::ok(json::zone_metrics(zone_id, &metrics))
}

/// `GET /api/v1/heatmap`
pub fn heatmap() -> Response {
    Response::ok(json::heatmap(now()))
}

/// `GET /api/v1/recommendations`
pub async fn recommendations(store: &MetricsStore) -> Response {
    let recommendations = store.all_recommendations().await;
    Response::ok(json::recommendations(&recommendations))
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
