use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::services::bootstrap::BootstrapReport;
use crate::state::AppState;

pub fn system_routes(state: AppState) -> Router {
    Router::new()
        .route("/bootstrap", get(get_bootstrap_status))
        .route("/ready", get(get_readiness))
        .route("/version", get(get_version))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct BootstrapStatusResponse {
    status: &'static str,
    database_reachable: bool,
    report: BootstrapReport,
}

/// Startup report plus a live database check
async fn get_bootstrap_status(State(state): State<AppState>) -> Json<BootstrapStatusResponse> {
    let report = state.bootstrap_report.read().await.clone();
    let database_reachable = state.db.is_reachable().await;

    let status = if report.is_degraded() || !database_reachable {
        "degraded"
    } else {
        "ok"
    };

    Json(BootstrapStatusResponse {
        status,
        database_reachable,
        report,
    })
}

/// Readiness check: 503 until the database answers
async fn get_readiness(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let db = state
        .db
        .get()
        .map_err(|e| AppError::ServiceUnavailable(e.to_string()))?;
    db.ping()
        .await
        .map_err(|e| AppError::ServiceUnavailable(format!("Database not reachable: {}", e)))?;

    Ok(Json(serde_json::json!({ "status": "ready" })))
}

/// Version info endpoint
async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "backend": "rust"
    }))
}
