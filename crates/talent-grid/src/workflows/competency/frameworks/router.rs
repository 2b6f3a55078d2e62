use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::super::access::Actor;
use super::super::audit::AuditLogWriter;
use super::domain::{FrameworkId, FrameworkView, JobTitleId};
use super::repository::{FrameworkRepository, RepositoryError};
use super::service::{
    CreateTemplateRequest, DuplicateRequest, FrameworkRevision, FrameworkServiceError,
    FrameworkVersioningService, NewVersionRequest,
};

/// Router builder exposing HTTP endpoints for framework administration.
pub fn framework_router<R, L>(service: Arc<FrameworkVersioningService<R, L>>) -> Router
where
    R: FrameworkRepository + 'static,
    L: AuditLogWriter + 'static,
{
    Router::new()
        .route(
            "/api/v1/competency/frameworks",
            post(create_template_handler::<R, L>),
        )
        .route(
            "/api/v1/competency/frameworks/:framework_id",
            get(get_framework_handler::<R, L>).delete(delete_framework_handler::<R, L>),
        )
        .route(
            "/api/v1/competency/frameworks/:framework_id/duplicate",
            post(duplicate_handler::<R, L>),
        )
        .route(
            "/api/v1/competency/job-titles/:job_title_id/versions",
            post(new_version_handler::<R, L>),
        )
        .route(
            "/api/v1/competency/job-titles/:job_title_id/framework",
            get(active_framework_handler::<R, L>),
        )
        .route(
            "/api/v1/competency/job-titles/:job_title_id/framework/history",
            get(history_handler::<R, L>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct CreateTemplatePayload {
    actor: Actor,
    #[serde(flatten)]
    request: CreateTemplateRequest,
}

#[derive(Debug, Deserialize)]
struct NewVersionPayload {
    actor: Actor,
    #[serde(default)]
    parent_framework_id: Option<FrameworkId>,
    #[serde(default)]
    fields: FrameworkRevision,
}

#[derive(Debug, Deserialize)]
struct DuplicatePayload {
    actor: Actor,
    #[serde(flatten)]
    request: DuplicateRequest,
}

#[derive(Debug, Deserialize)]
struct ActorPayload {
    actor: Actor,
}

async fn create_template_handler<R, L>(
    State(service): State<Arc<FrameworkVersioningService<R, L>>>,
    axum::Json(payload): axum::Json<CreateTemplatePayload>,
) -> Response
where
    R: FrameworkRepository + 'static,
    L: AuditLogWriter + 'static,
{
    match service.create_template(&payload.actor, payload.request) {
        Ok(framework) => (StatusCode::CREATED, axum::Json(framework)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn new_version_handler<R, L>(
    State(service): State<Arc<FrameworkVersioningService<R, L>>>,
    Path(job_title_id): Path<String>,
    axum::Json(payload): axum::Json<NewVersionPayload>,
) -> Response
where
    R: FrameworkRepository + 'static,
    L: AuditLogWriter + 'static,
{
    let request = NewVersionRequest {
        job_title_id: JobTitleId(job_title_id),
        parent_framework_id: payload.parent_framework_id,
        fields: payload.fields,
    };

    match service.create_new_version(&payload.actor, request) {
        Ok(outcome) => {
            let body = json!({
                "framework": outcome.framework,
                "previous": outcome.previous.summary_view(),
            });
            (StatusCode::CREATED, axum::Json(body)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn duplicate_handler<R, L>(
    State(service): State<Arc<FrameworkVersioningService<R, L>>>,
    Path(framework_id): Path<String>,
    axum::Json(payload): axum::Json<DuplicatePayload>,
) -> Response
where
    R: FrameworkRepository + 'static,
    L: AuditLogWriter + 'static,
{
    let source = FrameworkId(framework_id);
    match service.duplicate_template(&payload.actor, &source, payload.request) {
        Ok(framework) => (StatusCode::CREATED, axum::Json(framework)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_framework_handler<R, L>(
    State(service): State<Arc<FrameworkVersioningService<R, L>>>,
    Path(framework_id): Path<String>,
    axum::Json(payload): axum::Json<ActorPayload>,
) -> Response
where
    R: FrameworkRepository + 'static,
    L: AuditLogWriter + 'static,
{
    let id = FrameworkId(framework_id);
    match service.delete_template(&payload.actor, &id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_framework_handler<R, L>(
    State(service): State<Arc<FrameworkVersioningService<R, L>>>,
    Path(framework_id): Path<String>,
) -> Response
where
    R: FrameworkRepository + 'static,
    L: AuditLogWriter + 'static,
{
    match service.get(&FrameworkId(framework_id)) {
        Ok(framework) => (StatusCode::OK, axum::Json(framework)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn active_framework_handler<R, L>(
    State(service): State<Arc<FrameworkVersioningService<R, L>>>,
    Path(job_title_id): Path<String>,
) -> Response
where
    R: FrameworkRepository + 'static,
    L: AuditLogWriter + 'static,
{
    match service.active_for(&JobTitleId(job_title_id)) {
        Ok(framework) => (StatusCode::OK, axum::Json(framework)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn history_handler<R, L>(
    State(service): State<Arc<FrameworkVersioningService<R, L>>>,
    Path(job_title_id): Path<String>,
) -> Response
where
    R: FrameworkRepository + 'static,
    L: AuditLogWriter + 'static,
{
    match service.history(&JobTitleId(job_title_id)) {
        Ok(history) => {
            let views: Vec<FrameworkView> = history
                .iter()
                .map(|framework| framework.summary_view())
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Map service errors onto the API surface. Authorization failures share one
/// generic body independent of resource state.
fn error_response(err: FrameworkServiceError) -> Response {
    let (status, message) = match &err {
        FrameworkServiceError::Access(_) => (StatusCode::FORBIDDEN, err.to_string()),
        FrameworkServiceError::Validation(_) | FrameworkServiceError::ParentMismatch { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        FrameworkServiceError::NoActiveTemplate { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        FrameworkServiceError::TemplateExists { .. }
        | FrameworkServiceError::FrameworkInUse { .. } => (StatusCode::CONFLICT, err.to_string()),
        FrameworkServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        FrameworkServiceError::Repository(RepositoryError::Conflict) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        FrameworkServiceError::Repository(RepositoryError::Unavailable(_))
        | FrameworkServiceError::Audit(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };

    let body = axum::Json(json!({ "error": message }));
    (status, body).into_response()
}
