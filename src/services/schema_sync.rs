//! Schema synchronizer
//!
//! Creates missing tables without ever altering or dropping existing ones.
//! Lock contention with another process doing the same (for example a second
//! replica starting at the same time) is retried a bounded number of times.

use std::sync::Arc;

use sea_orm::DbErr;

use super::bootstrap::{DataStore, SyncOptions};
use super::retry::{is_lock_contention, with_retry, LockContentionPolicy, RetryConfig};
use crate::error::BootstrapError;

/// Result of a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub attempts: u32,
    pub error: Option<BootstrapError>,
}

impl SyncOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<(), BootstrapError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

pub struct SchemaSynchronizer {
    store: Arc<dyn DataStore>,
    retry: RetryConfig,
}

impl SchemaSynchronizer {
    pub fn new(store: Arc<dyn DataStore>, retry: RetryConfig) -> Self {
        Self { store, retry }
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }

    /// Sync and report success. Never fails.
    pub async fn sync(&self) -> bool {
        self.run().await.succeeded()
    }

    /// Sync with retry on lock contention, returning the attempt count and
    /// the classified error of the last attempt
    pub async fn run(&self) -> SyncOutcome {
        let options = SyncOptions {
            structural_changes: false,
            force_recreate: false,
        };

        let attempted = with_retry(&self.retry, &LockContentionPolicy, || {
            self.store.sync(options)
        })
        .await;

        let error = match attempted.result {
            Ok(()) => {
                tracing::info!(attempts = attempted.attempts, "Schema synchronized");
                None
            }
            Err(e) => {
                let error = classify(&e);
                if is_lock_contention(&e) {
                    tracing::error!(
                        attempts = attempted.attempts,
                        error = %e,
                        "Schema sync gave up after repeated lock contention"
                    );
                } else {
                    tracing::error!(error = %e, "Schema sync failed");
                }
                Some(error)
            }
        };

        SyncOutcome {
            attempts: attempted.attempts,
            error,
        }
    }
}

fn classify(error: &DbErr) -> BootstrapError {
    if is_lock_contention(error) {
        return BootstrapError::LockContention(error.to_string());
    }
    match error {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => BootstrapError::Connection(error.to_string()),
        // Everything else is a failure to apply the declared schema
        _ => BootstrapError::Migration(error.to_string()),
    }
}
