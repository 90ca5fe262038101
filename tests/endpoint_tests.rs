//! Tests for the health and system endpoints

mod common;
use common::create_test_db;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::sync::RwLock;
use tower::ServiceExt;

use restobar::db::DbHandle;
use restobar::endpoints::create_router;
use restobar::error::BootstrapError;
use restobar::services::bootstrap::{
    BootstrapReport, BootstrapState, SharedReport, StepRecord, StepStatus,
};
use restobar::state::AppState;

fn succeeded(name: &'static str, target: BootstrapState) -> StepRecord {
    StepRecord {
        name,
        target,
        status: StepStatus::Succeeded,
        attempts: 1,
        elapsed: Duration::from_millis(5),
    }
}

fn shared(report: BootstrapReport) -> SharedReport {
    Arc::new(RwLock::new(report))
}

async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let state = AppState::new(DbHandle::unavailable("no url"), shared(BootstrapReport::new()));

    let response = create_router(state)
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_bootstrap_status_ok() {
    let mut report = BootstrapReport::new();
    report.record(succeeded("connect", BootstrapState::DbConnected));
    report.mark_listening();
    let state = AppState::new(DbHandle::from(create_test_db().await), shared(report));

    let (status, json) = get_json(state, "/api/system/bootstrap").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database_reachable"], true);
    assert_eq!(json["report"]["state"], "listening");
    assert_eq!(json["report"]["steps"][0]["name"], "connect");
    assert_eq!(json["report"]["steps"][0]["status"], "succeeded");
}

#[tokio::test]
async fn test_bootstrap_status_degraded_on_failed_step() {
    let mut report = BootstrapReport::new();
    report.record(succeeded("connect", BootstrapState::DbConnected));
    report.record(StepRecord {
        name: "migrate",
        target: BootstrapState::Migrated,
        status: StepStatus::Failed(BootstrapError::Migration("syntax error".to_string())),
        attempts: 1,
        elapsed: Duration::from_millis(12),
    });
    report.mark_listening();
    let state = AppState::new(DbHandle::from(create_test_db().await), shared(report));

    let (_, json) = get_json(state, "/api/system/bootstrap").await;

    assert_eq!(json["status"], "degraded");
    let failed = &json["report"]["steps"][1];
    assert_eq!(failed["status"], "failed");
    assert_eq!(failed["error_kind"], "migration_error");
    assert_eq!(failed["error"], "syntax error");
}

#[tokio::test]
async fn test_bootstrap_status_degraded_without_database() {
    let state = AppState::new(DbHandle::unavailable("no url"), shared(BootstrapReport::new()));

    let (status, json) = get_json(state, "/api/system/bootstrap").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database_reachable"], false);
}

#[tokio::test]
async fn test_version() {
    let state = AppState::new(DbHandle::unavailable("no url"), shared(BootstrapReport::new()));

    let (status, json) = get_json(state, "/api/system/version").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_readiness_with_database() {
    let state = AppState::new(DbHandle::from(create_test_db().await), shared(BootstrapReport::new()));

    let (status, json) = get_json(state, "/api/system/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ready");
}

#[tokio::test]
async fn test_readiness_without_database() {
    let state = AppState::new(DbHandle::unavailable("no url"), shared(BootstrapReport::new()));

    let (status, json) = get_json(state, "/api/system/ready").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["detail"].as_str().unwrap().contains("no url"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let state = AppState::new(DbHandle::unavailable("no url"), shared(BootstrapReport::new()));

    let response = create_router(state)
        .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["detail"], "No route for /api/nope");
}
