use async_trait::async_trait;
use sea_orm::sea_query::Table;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::sync::Arc;
use std::time::Duration;

use crate::config::database::DatabaseConfig;
use crate::models::prelude::*;
use crate::services::bootstrap::{DataStore, SyncOptions};

pub type DbConn = DatabaseConnection;

/// Database handle shared by every component.
///
/// Holds no connection when the configured URL could not even be parsed, so
/// that startup can continue in degraded mode. Pool connections are opened
/// lazily, which means an unreachable server only shows up on first use.
#[derive(Clone)]
pub struct DbHandle {
    conn: Option<DbConn>,
    unavailable_reason: Arc<str>,
}

impl DbHandle {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Self {
            conn: None,
            unavailable_reason: reason.into(),
        }
    }

    /// Get the connection, or an error describing why there is none
    pub fn get(&self) -> Result<&DbConn, DbErr> {
        self.conn.as_ref().ok_or_else(|| {
            DbErr::Custom(format!(
                "Database not configured: {}",
                self.unavailable_reason
            ))
        })
    }

    pub fn is_configured(&self) -> bool {
        self.conn.is_some()
    }

    /// True when the store answers a ping right now
    pub async fn is_reachable(&self) -> bool {
        match &self.conn {
            Some(conn) => conn.ping().await.is_ok(),
            None => false,
        }
    }
}

impl From<DbConn> for DbHandle {
    fn from(conn: DbConn) -> Self {
        Self {
            conn: Some(conn),
            unavailable_reason: Arc::from(""),
        }
    }
}

/// Create the connection pool without touching the network.
pub async fn connect(config: &DatabaseConfig) -> DbHandle {
    tracing::info!("Configuring database pool for {}", config.redacted_url());

    let mut opts = ConnectOptions::new(config.database_url.as_str());
    opts.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect_lazy(true)
        .sqlx_logging(false);

    match Database::connect(opts).await {
        Ok(conn) => DbHandle::from(conn),
        Err(e) => {
            tracing::error!("Invalid database configuration: {}", e);
            DbHandle::unavailable(e.to_string())
        }
    }
}

/// `CREATE TABLE IF NOT EXISTS` for an entity. Never alters an existing table.
pub async fn create_table_if_missing<E>(db: &DbConn, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

async fn drop_table_if_exists<E>(db: &DbConn, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let stmt = Table::drop().table(entity).if_exists().to_owned();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// SeaORM-backed data store used by the connectivity check and the schema
/// synchronizer
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DbHandle,
}

impl SeaOrmStore {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DataStore for SeaOrmStore {
    async fn authenticate(&self) -> Result<(), DbErr> {
        self.db.get()?.ping().await
    }

    async fn sync(&self, options: SyncOptions) -> Result<(), DbErr> {
        let db = self.db.get()?;

        if options.structural_changes {
            return Err(DbErr::Custom(
                "Structural schema changes are applied by migrations, not by sync".to_string(),
            ));
        }

        if options.force_recreate {
            tracing::warn!("Dropping core tables before sync");
            // Children first so foreign keys never dangle
            drop_table_if_exists(db, CierreCaja).await?;
            drop_table_if_exists(db, Venta).await?;
            drop_table_if_exists(db, Caja).await?;
            drop_table_if_exists(db, Usuario).await?;
            drop_table_if_exists(db, Role).await?;
        }

        // Parents first so foreign keys resolve
        create_table_if_missing(db, Role).await?;
        create_table_if_missing(db, Usuario).await?;
        create_table_if_missing(db, Caja).await?;
        create_table_if_missing(db, Venta).await?;
        create_table_if_missing(db, CierreCaja).await?;

        Ok(())
    }
}
