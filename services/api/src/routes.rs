use crate::infra::{AppState, InMemoryAccountDirectory, InMemoryListingRepository};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use urbanista::listings::{listing_router, ListingService};

pub(crate) fn with_listing_routes(
    service: Arc<ListingService<InMemoryListingRepository, InMemoryAccountDirectory>>,
) -> axum::Router {
    listing_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
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
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;
    use urbanista::catalog::Catalog;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body.get("status"), Some(&json!("ok")));
    }

    fn test_router(ready: bool) -> axum::Router {
        let catalog = Arc::new(Catalog::standard());
        let repository = Arc::new(InMemoryListingRepository::new(catalog.clone()));
        let directory = Arc::new(InMemoryAccountDirectory::seeded());
        let service = Arc::new(ListingService::new(catalog, repository, directory));

        let handle = PrometheusBuilder::new().build_recorder().handle();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(handle),
        };
        with_listing_routes(service).layer(Extension(state))
    }

    #[tokio::test]
    async fn readiness_flips_with_the_flag() {
        let response = test_router(false)
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = test_router(true)
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn lookup_routes_are_mounted_alongside_probes() {
        let response = test_router(true)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/offer-types")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
