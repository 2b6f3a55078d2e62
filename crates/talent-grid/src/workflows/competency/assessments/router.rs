use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::super::access::Actor;
use super::super::audit::AuditLogWriter;
use super::super::frameworks::domain::WorkspaceId;
use super::super::frameworks::repository::FrameworkRepository;
use super::domain::{AssessmentId, AssessmentView};
use super::export::assessments_csv_string;
use super::repository::{AssessmentRepository, RepositoryError};
use super::service::{
    AssessmentService, AssessmentServiceError, CreateAssessmentRequest, SaveScoresRequest,
};

/// Router builder exposing HTTP endpoints for the assessment lifecycle.
pub fn assessment_router<F, A, L>(service: Arc<AssessmentService<F, A, L>>) -> Router
where
    F: FrameworkRepository + 'static,
    A: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    Router::new()
        .route(
            "/api/v1/competency/assessments",
            post(create_handler::<F, A, L>).get(list_handler::<F, A, L>),
        )
        .route(
            "/api/v1/competency/assessments/export",
            get(export_handler::<F, A, L>),
        )
        .route(
            "/api/v1/competency/assessments/:assessment_id",
            get(get_handler::<F, A, L>),
        )
        .route(
            "/api/v1/competency/assessments/:assessment_id/scores",
            put(save_scores_handler::<F, A, L>),
        )
        .route(
            "/api/v1/competency/assessments/:assessment_id/submit",
            post(submit_handler::<F, A, L>),
        )
        .route(
            "/api/v1/competency/assessments/:assessment_id/calibrate",
            post(calibrate_handler::<F, A, L>),
        )
        .route(
            "/api/v1/competency/assessments/:assessment_id/cancel",
            post(cancel_handler::<F, A, L>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct CreatePayload {
    actor: Actor,
    #[serde(flatten)]
    request: CreateAssessmentRequest,
}

#[derive(Debug, Deserialize)]
struct SavePayload {
    actor: Actor,
    #[serde(flatten)]
    request: SaveScoresRequest,
}

#[derive(Debug, Deserialize)]
struct ActorPayload {
    actor: Actor,
}

#[derive(Debug, Deserialize)]
struct CalibratePayload {
    actor: Actor,
    note: String,
}

#[derive(Debug, Deserialize)]
struct WorkspaceQuery {
    workspace_id: String,
}

async fn create_handler<F, A, L>(
    State(service): State<Arc<AssessmentService<F, A, L>>>,
    axum::Json(payload): axum::Json<CreatePayload>,
) -> Response
where
    F: FrameworkRepository + 'static,
    A: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    match service.create(&payload.actor, payload.request) {
        Ok(assessment) => {
            (StatusCode::CREATED, axum::Json(assessment.status_view())).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn get_handler<F, A, L>(
    State(service): State<Arc<AssessmentService<F, A, L>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    F: FrameworkRepository + 'static,
    A: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    match service.get(&AssessmentId(assessment_id)) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_handler<F, A, L>(
    State(service): State<Arc<AssessmentService<F, A, L>>>,
    Query(query): Query<WorkspaceQuery>,
) -> Response
where
    F: FrameworkRepository + 'static,
    A: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    match service.for_workspace(&WorkspaceId(query.workspace_id)) {
        Ok(assessments) => {
            let views: Vec<AssessmentView> = assessments
                .iter()
                .map(|assessment| assessment.status_view())
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn save_scores_handler<F, A, L>(
    State(service): State<Arc<AssessmentService<F, A, L>>>,
    Path(assessment_id): Path<String>,
    axum::Json(payload): axum::Json<SavePayload>,
) -> Response
where
    F: FrameworkRepository + 'static,
    A: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.save_scores(&payload.actor, &id, payload.request) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn submit_handler<F, A, L>(
    State(service): State<Arc<AssessmentService<F, A, L>>>,
    Path(assessment_id): Path<String>,
    axum::Json(payload): axum::Json<ActorPayload>,
) -> Response
where
    F: FrameworkRepository + 'static,
    A: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.submit(&payload.actor, &id) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

async fn calibrate_handler<F, A, L>(
    State(service): State<Arc<AssessmentService<F, A, L>>>,
    Path(assessment_id): Path<String>,
    axum::Json(payload): axum::Json<CalibratePayload>,
) -> Response
where
    F: FrameworkRepository + 'static,
    A: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.calibrate(&payload.actor, &id, payload.note) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

async fn cancel_handler<F, A, L>(
    State(service): State<Arc<AssessmentService<F, A, L>>>,
    Path(assessment_id): Path<String>,
    axum::Json(payload): axum::Json<ActorPayload>,
) -> Response
where
    F: FrameworkRepository + 'static,
    A: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.cancel(&payload.actor, &id) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

async fn export_handler<F, A, L>(
    State(service): State<Arc<AssessmentService<F, A, L>>>,
    Query(query): Query<WorkspaceQuery>,
) -> Response
where
    F: FrameworkRepository + 'static,
    A: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    let assessments = match service.for_workspace(&WorkspaceId(query.workspace_id)) {
        Ok(assessments) => assessments,
        Err(err) => return error_response(err),
    };

    match assessments_csv_string(&assessments) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(err) => {
            let body = axum::Json(json!({ "error": err.to_string() }));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

/// Map service errors onto the API surface. Authorization responses carry
/// the same generic body everywhere.
fn error_response(err: AssessmentServiceError) -> Response {
    let (status, message) = match &err {
        AssessmentServiceError::Access(_) => (StatusCode::FORBIDDEN, err.to_string()),
        AssessmentServiceError::Scores(_)
        | AssessmentServiceError::EvaluatorRequired
        | AssessmentServiceError::EvaluatorForbidden => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        AssessmentServiceError::Transition(_)
        | AssessmentServiceError::ScoresLocked { .. }
        | AssessmentServiceError::Incomplete { .. } => (StatusCode::CONFLICT, err.to_string()),
        AssessmentServiceError::NoActiveFramework { .. } => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        AssessmentServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        AssessmentServiceError::Repository(RepositoryError::Conflict) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        AssessmentServiceError::FrameworkMissing { .. }
        | AssessmentServiceError::Repository(RepositoryError::Unavailable(_))
        | AssessmentServiceError::Audit(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };

    let body = axum::Json(json!({ "error": message }));
    (status, body).into_response()
}
