use crate::cli::ServeArgs;
use crate::infra::{framework_options, AppState, CompetencyStore, InMemoryAuditLog};
use crate::routes::with_competency_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talent_grid::config::AppConfig;
use talent_grid::error::AppError;
use talent_grid::telemetry;
use talent_grid::workflows::competency::assessments::AssessmentService;
use talent_grid::workflows::competency::frameworks::FrameworkVersioningService;
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

    let store = Arc::new(CompetencyStore::default());
    let audit = Arc::new(InMemoryAuditLog::default());
    let framework_service = Arc::new(FrameworkVersioningService::with_options(
        store.clone(),
        audit.clone(),
        framework_options(&config.competency),
    ));
    let assessment_service = Arc::new(AssessmentService::new(store.clone(), store, audit));

    let app = with_competency_routes(framework_service, assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "competency management service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
