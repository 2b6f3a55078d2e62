use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::competency::frameworks::router::framework_router;

fn build_router() -> axum::Router {
    let (service, _, _) = build_service();
    framework_router(Arc::new(service))
}

fn create_body(actor_role: &str) -> Value {
    json!({
        "actor": { "user_id": "user-owner", "role": actor_role },
        "job_title_id": "account-executive",
        "name": "AE Framework",
        "weights": { "format": "fraction", "behavioral": 0.5, "technical": 0.3, "process": 0.2 },
        "competencies": {
            "behavioral": [
                { "id": "beh-1", "name": "Listening" },
                { "id": "beh-2", "name": "Resilience" }
            ],
            "technical": [
                { "id": "tech-1", "name": "Product depth" },
                { "id": "tech-2", "name": "Discovery" }
            ],
            "process": [
                { "id": "proc-1", "name": "CRM hygiene" }
            ]
        },
        "ranges": {
            "behavioral": { "junior": { "min": 0, "max": 60 }, "pleno": { "min": 61, "max": 80 }, "senior": { "min": 81, "max": 100 } },
            "technical": { "junior": { "min": 0, "max": 60 }, "pleno": { "min": 61, "max": 80 }, "senior": { "min": 81, "max": 100 } },
            "process": { "junior": { "min": 0, "max": 60 }, "pleno": { "min": 61, "max": 80 }, "senior": { "min": 81, "max": 100 } },
            "global": { "junior": { "min": 0, "max": 60 }, "pleno": { "min": 61, "max": 80 }, "senior": { "min": 81, "max": 100 } }
        }
    })
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request")
}

#[tokio::test]
async fn post_frameworks_creates_template() {
    let router = build_router();

    let response = router
        .oneshot(post("/api/v1/competency/frameworks", &create_body("system_owner")))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("version").and_then(Value::as_u64), Some(1));
    assert_eq!(payload.get("is_active").and_then(Value::as_bool), Some(true));
}

#[tokio::test]
async fn post_frameworks_rejects_non_owners_uniformly() {
    let router = build_router();

    let response = router
        .oneshot(post("/api/v1/competency/frameworks", &create_body("member")))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("not authorized")
    );
}

#[tokio::test]
async fn post_versions_chains_and_reports_previous() {
    let router = build_router();

    let created = router
        .clone()
        .oneshot(post("/api/v1/competency/frameworks", &create_body("system_owner")))
        .await
        .expect("router dispatch");
    assert_eq!(created.status(), StatusCode::CREATED);
    let v1 = read_json_body(created).await;

    let version_body = json!({
        "actor": { "user_id": "user-owner", "role": "system_owner" },
        "fields": { "name": "AE Framework 2026" }
    });
    let response = router
        .clone()
        .oneshot(post(
            "/api/v1/competency/job-titles/account-executive/versions",
            &version_body,
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    let framework = payload.get("framework").expect("framework present");
    assert_eq!(framework.get("version").and_then(Value::as_u64), Some(2));
    assert_eq!(
        framework.get("parent_framework_id").cloned(),
        v1.get("id").cloned()
    );
    assert_eq!(
        payload
            .get("previous")
            .and_then(|previous| previous.get("version"))
            .and_then(Value::as_u64),
        Some(1)
    );

    let active = router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/competency/job-titles/account-executive/framework")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(active.status(), StatusCode::OK);
    let active = read_json_body(active).await;
    assert_eq!(active.get("version").and_then(Value::as_u64), Some(2));

    let history = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/competency/job-titles/account-executive/framework/history")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(history.status(), StatusCode::OK);
    let history = read_json_body(history).await;
    assert_eq!(history.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn post_versions_surfaces_weight_validation() {
    let router = build_router();
    router
        .clone()
        .oneshot(post("/api/v1/competency/frameworks", &create_body("system_owner")))
        .await
        .expect("router dispatch");

    let version_body = json!({
        "actor": { "user_id": "user-owner", "role": "system_owner" },
        "fields": {
            "weights": { "format": "fraction", "behavioral": 0.5, "technical": 0.3, "process": 0.3 }
        }
    });
    let response = router
        .oneshot(post(
            "/api/v1/competency/job-titles/account-executive/versions",
            &version_body,
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    let message = payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert!(message.contains("1.1"), "message cites the sum: {message}");
}

#[tokio::test]
async fn missing_active_framework_is_a_usable_404() {
    let router = build_router();

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/competency/job-titles/unknown-title/framework")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("no framework configured for this job title")
    );
}
