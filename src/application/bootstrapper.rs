//! Application bootstrapper
//!
//! Wires the concrete SeaORM/axum collaborators into the startup sequence
//! and runs the service until shutdown.

use std::sync::Arc;

use axum::Router;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, CONFIG};
use crate::db::{self, SeaOrmStore};
use crate::endpoints;
use crate::listener::AxumListener;
use crate::services::bootstrap::{BootstrapReport, Bootstrapper, Collaborators, JobScheduler};
use crate::services::retry::RetryConfig;
use crate::services::{SeaOrmMigrationRunner, SeaOrmSeeder, TaskScheduler};
use crate::state::AppState;

/// Bootstrap and run the application
pub async fn run() -> anyhow::Result<()> {
    let config: &Config = &CONFIG;
    init_tracing(config);

    tracing::info!("Starting Restobar backend v{}", config.version);

    let db = db::connect(&config.database).await;
    let report = Arc::new(RwLock::new(BootstrapReport::new()));
    let shutdown = CancellationToken::new();

    let scheduler = Arc::new(TaskScheduler::cierre_caja(
        db.clone(),
        config.scheduler.clone(),
    ));

    let app = create_app(AppState::new(db.clone(), report.clone()));

    let bootstrapper = Bootstrapper::new(
        Collaborators {
            store: Arc::new(SeaOrmStore::new(db.clone())),
            migrations: Arc::new(SeaOrmMigrationRunner::new(db.clone())),
            seeder: Arc::new(SeaOrmSeeder::new(db.clone(), config.admin.clone())),
            scheduler: scheduler.clone(),
            listener: Arc::new(AxumListener::new(app, shutdown.clone())),
        },
        RetryConfig::from(&config.bootstrap),
    )
    .with_report(report);

    let started = bootstrapper.start(config.server.bind_addr()).await?;

    tokio::spawn(watch_shutdown_signal(shutdown.clone()));

    let served = started.server.wait().await;
    scheduler.stop();
    scheduler.shutdown().await;
    served?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("restobar={},tower_http=info", config.log_level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(false))
            .init();
    }
}

/// Create the main application router
fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM
async fn watch_shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
