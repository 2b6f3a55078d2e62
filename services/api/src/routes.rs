use crate::infra::AppState;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use talent_grid::workflows::competency::assessments::{
    assessment_router, AssessmentRepository, AssessmentService, AssessmentStatus,
    SeniorityAssessment,
};
use talent_grid::workflows::competency::audit::AuditLogWriter;
use talent_grid::workflows::competency::frameworks::{
    framework_router, FrameworkRepository, FrameworkVersioningService, SeniorityLevel,
    WorkspaceId,
};

pub(crate) fn with_competency_routes<FR, AR, L>(
    frameworks: Arc<FrameworkVersioningService<FR, L>>,
    assessments: Arc<AssessmentService<FR, AR, L>>,
) -> axum::Router
where
    FR: FrameworkRepository + 'static,
    AR: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    framework_router(frameworks)
        .merge(assessment_router(assessments.clone()))
        .merge(
            axum::Router::new()
                .route(
                    "/api/v1/competency/overview",
                    axum::routing::get(overview_endpoint::<FR, AR, L>),
                )
                .with_state(assessments),
        )
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

#[derive(Debug, Deserialize)]
pub(crate) struct OverviewQuery {
    pub(crate) workspace_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompetencyOverviewResponse {
    pub(crate) workspace_id: String,
    pub(crate) total_assessments: usize,
    pub(crate) by_status: Vec<StatusCount>,
    pub(crate) level_distribution: Vec<LevelCount>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusCount {
    pub(crate) status: &'static str,
    pub(crate) count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct LevelCount {
    pub(crate) level: &'static str,
    pub(crate) count: usize,
}

/// Workspace roll-up: how many assessments sit in each lifecycle state and
/// how the scored population distributes across seniority levels.
pub(crate) fn build_overview(
    workspace_id: String,
    assessments: &[SeniorityAssessment],
) -> CompetencyOverviewResponse {
    const STATUSES: [AssessmentStatus; 5] = [
        AssessmentStatus::Draft,
        AssessmentStatus::SelfSubmitted,
        AssessmentStatus::LeaderSubmitted,
        AssessmentStatus::Calibrated,
        AssessmentStatus::Cancelled,
    ];
    const LEVELS: [SeniorityLevel; 3] = [
        SeniorityLevel::Junior,
        SeniorityLevel::Pleno,
        SeniorityLevel::Senior,
    ];

    let by_status = STATUSES
        .iter()
        .map(|status| StatusCount {
            status: status.label(),
            count: assessments
                .iter()
                .filter(|assessment| assessment.status == *status)
                .count(),
        })
        .collect();

    // Cancelled rows carry whatever scores they died with; leave them out of
    // the level picture.
    let level_distribution = LEVELS
        .iter()
        .map(|level| LevelCount {
            level: level.label(),
            count: assessments
                .iter()
                .filter(|assessment| {
                    assessment.status != AssessmentStatus::Cancelled
                        && assessment.results.global.level == *level
                })
                .count(),
        })
        .collect();

    CompetencyOverviewResponse {
        workspace_id,
        total_assessments: assessments.len(),
        by_status,
        level_distribution,
    }
}

pub(crate) async fn overview_endpoint<FR, AR, L>(
    State(service): State<Arc<AssessmentService<FR, AR, L>>>,
    Query(query): Query<OverviewQuery>,
) -> impl IntoResponse
where
    FR: FrameworkRepository + 'static,
    AR: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    match service.for_workspace(&WorkspaceId(query.workspace_id.clone())) {
        Ok(assessments) => {
            let overview = build_overview(query.workspace_id, &assessments);
            (StatusCode::OK, Json(overview)).into_response()
        }
        Err(err) => {
            let body = Json(json!({ "error": err.to_string() }));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}
