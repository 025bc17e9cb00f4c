use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_support_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use unterhalt::config::AppConfig;
use unterhalt::error::AppError;
use unterhalt::support::SupportCalculator;
use unterhalt::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let table = Arc::new(config.table.load_table()?);
    info!(
        year = table.year(),
        brackets = table.brackets().len(),
        "support table loaded"
    );
    let calculator = SupportCalculator::new(table);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_support_routes()
        .layer(Extension(calculator))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "child support service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
