use crate::cli::ServeArgs;
use crate::infra::{build_services, AppState};
use crate::routes::with_core_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bloodbank::clock::{Clock, SystemClock};
use bloodbank::config::AppConfig;
use bloodbank::error::AppError;
use bloodbank::storage::InMemoryStockRepository;
use bloodbank::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let stock = Arc::new(InMemoryStockRepository::provisioned(clock.now()));
    let services = build_services(
        stock,
        config.ledger.clone(),
        config.eligibility.clone(),
        clock,
    );

    let app = with_core_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        critical_below = config.ledger.thresholds.critical_below,
        conflict_retries = config.ledger.max_conflict_retries,
        "blood bank service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
