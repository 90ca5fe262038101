pub mod system;

use axum::http::Uri;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", axum::routing::get(health_check))
        .nest("/api/system", system::system_routes(state))
        .fallback(not_found)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
