use crate::cli::ServeArgs;
use crate::infra::{load_banks, AppState, InMemoryAttemptRepository};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use skillgate::config::AppConfig;
use skillgate::error::AppError;
use skillgate::telemetry;
use skillgate::workflows::assessment::{AssessmentService, IntervalClock};
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let banks = load_banks(config.assessment.bank_path.as_deref())?;
    let attempts = Arc::new(InMemoryAttemptRepository::default());
    let clock = Arc::new(IntervalClock::new(config.assessment.tick_period()));
    let assessment_service = Arc::new(
        AssessmentService::new(Arc::new(banks), attempts, clock)
            .with_retained_completed(config.assessment.retained_completed),
    );

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        tick_millis = config.assessment.tick_millis,
        "assessment service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
