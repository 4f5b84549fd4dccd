use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryNotificationPublisher, InMemoryReviewRepository, StaticCatalog,
    StaticStaffDirectory,
};
use crate::routes::with_review_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use lineops::config::AppConfig;
use lineops::error::AppError;
use lineops::reviews::ReviewService;
use lineops::telemetry;
use tracing::info;

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

    let repository = Arc::new(InMemoryReviewRepository::default());
    let catalog = Arc::new(StaticCatalog::default());
    let staff = Arc::new(StaticStaffDirectory::default());
    let notifier = Arc::new(InMemoryNotificationPublisher::default());
    let review_service = Arc::new(ReviewService::new(
        repository,
        catalog,
        staff,
        notifier,
        config.engine.clone(),
    ));

    let app = with_review_routes(review_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "review engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
