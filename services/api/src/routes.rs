use crate::infra::{AppState, Services};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use bloodbank::donors::donor_router;
use bloodbank::inventory::inventory_router;
use serde_json::json;
use std::sync::atomic::Ordering;

/// Inventory and donor routes plus the operational endpoints.
pub(crate) fn with_core_routes(services: Services) -> Router {
    inventory_router(services.ledger)
        .merge(donor_router(services.donors))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::build_services;
    use axum::body::Body;
    use axum::http::Request;
    use bloodbank::clock::FixedClock;
    use bloodbank::eligibility::EligibilityPolicy;
    use bloodbank::inventory::LedgerConfig;
    use bloodbank::storage::InMemoryStockRepository;
    use chrono::{TimeZone, Utc};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(ready: bool) -> Router {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap();
        let services = build_services(
            Arc::new(InMemoryStockRepository::provisioned(now)),
            LedgerConfig::default(),
            EligibilityPolicy::default(),
            Arc::new(FixedClock::new(now)),
        );
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_core_routes(services).layer(Extension(state))
    }

    async fn get_status(router: Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .expect("route executes")
            .status()
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        assert_eq!(get_status(app(false), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_flag() {
        assert_eq!(
            get_status(app(false), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(get_status(app(true), "/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_renders_text() {
        assert_eq!(get_status(app(true), "/metrics").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn core_routes_are_mounted() {
        let router = app(true);
        assert_eq!(
            get_status(router.clone(), "/api/v1/inventory").await,
            StatusCode::OK
        );
        assert_eq!(
            get_status(router, "/api/v1/donors").await,
            StatusCode::OK
        );
    }
}
