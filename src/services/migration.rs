use async_trait::async_trait;
use sea_orm_migration::MigratorTrait;

use super::bootstrap::MigrationRunner;
use crate::db::DbHandle;
use crate::error::BootstrapError;
use crate::migrations::Migrator;

/// Runs the embedded SeaORM migrations. Applied migrations are tracked in
/// `seaql_migrations`, so each one runs at most once per database.
pub struct SeaOrmMigrationRunner {
    db: DbHandle,
}

impl SeaOrmMigrationRunner {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MigrationRunner for SeaOrmMigrationRunner {
    async fn run(&self) -> Result<(), BootstrapError> {
        let db = self
            .db
            .get()
            .map_err(|e| BootstrapError::Migration(e.to_string()))?;

        let pending = Migrator::get_pending_migrations(db)
            .await
            .map_err(|e| BootstrapError::Migration(e.to_string()))?;

        if pending.is_empty() {
            tracing::info!("No pending database migrations");
            return Ok(());
        }

        for migration in &pending {
            tracing::info!(migration = migration.name(), "Pending migration");
        }

        Migrator::up(db, None)
            .await
            .map_err(|e| BootstrapError::Migration(e.to_string()))?;
        tracing::info!(applied = pending.len(), "Database migrations completed");

        Ok(())
    }
}
