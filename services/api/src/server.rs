use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAccountDirectory, InMemoryListingRepository};
use crate::routes::with_listing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use urbanista::catalog::Catalog;
use urbanista::config::AppConfig;
use urbanista::error::AppError;
use urbanista::listings::{ListingService, MediaPolicy};
use urbanista::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(Catalog::standard());
    let repository = Arc::new(InMemoryListingRepository::new(catalog.clone()));
    let directory = Arc::new(InMemoryAccountDirectory::seeded());
    let listing_service = Arc::new(ListingService::with_limits(
        catalog,
        repository,
        directory,
        MediaPolicy::new(config.listings.media_max_bytes),
        config.listings.page_size,
    ));

    let app = with_listing_routes(listing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "classifieds service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
