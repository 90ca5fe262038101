use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Bcrypt(e) => {
                tracing::error!("Bcrypt error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of a single startup step.
///
/// Every variant except `ListenerBind` is recovered by the bootstrapper and
/// recorded in the report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Lock contention during schema sync: {0}")]
    LockContention(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Seeding failed: {0}")]
    Seed(String),

    #[error("Scheduler failed to start: {0}")]
    SchedulerStart(String),

    #[error("Listener bind failed: {0}")]
    ListenerBind(String),
}

impl BootstrapError {
    /// Stable label used in logs and in the JSON report
    pub fn kind(&self) -> &'static str {
        match self {
            BootstrapError::Connection(_) => "connection_error",
            BootstrapError::LockContention(_) => "lock_contention_error",
            BootstrapError::Migration(_) => "migration_error",
            BootstrapError::Seed(_) => "seed_error",
            BootstrapError::SchedulerStart(_) => "scheduler_start_error",
            BootstrapError::ListenerBind(_) => "listener_bind_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BootstrapError::Connection(msg)
            | BootstrapError::LockContention(msg)
            | BootstrapError::Migration(msg)
            | BootstrapError::Seed(msg)
            | BootstrapError::SchedulerStart(msg)
            | BootstrapError::ListenerBind(msg) => msg,
        }
    }
}
