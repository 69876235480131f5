use crate::cli::ServeArgs;
use crate::infra::{load_rules, AppState, InMemoryPreferenceStore, StaticRateTable};
use crate::routes::with_quote_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use lifequote::config::AppConfig;
use lifequote::error::AppError;
use lifequote::quoting::QuoteService;
use lifequote::telemetry;
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let rules = Arc::new(load_rules(&config.rules));
    let pricing = Arc::new(StaticRateTable::new(Local::now().date_naive()));
    let preferences = Arc::new(InMemoryPreferenceStore::default());
    let service = Arc::new(QuoteService::new(rules, pricing, preferences));

    let app = with_quote_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "life quote service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
