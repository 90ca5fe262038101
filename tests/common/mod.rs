//! Test helpers shared by the integration tests.
//!
//! Provides in-memory SQLite databases and recording doubles for every
//! collaborator of the startup sequence.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sea_orm::{Database, DatabaseConnection, DbErr};

use restobar::config::admin::AdminConfig;
use restobar::db::{DbHandle, SeaOrmStore};
use restobar::error::BootstrapError;
use restobar::services::bootstrap::{
    Bootstrapper, Collaborators, DataStore, JobScheduler, Listener, MigrationRunner, Seeder,
    ServerHandle, SyncOptions,
};
use restobar::services::retry::RetryConfig;
use restobar::services::SeaOrmMigrationRunner;

/// Create an empty in-memory SQLite database
pub async fn create_test_db() -> DatabaseConnection {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// Create an in-memory database with the core schema synced and all
/// migrations applied
pub async fn create_synced_db() -> DatabaseConnection {
    let db = create_test_db().await;
    let handle = DbHandle::from(db.clone());

    SeaOrmStore::new(handle.clone())
        .sync(SyncOptions::default())
        .await
        .expect("Failed to sync test schema");
    SeaOrmMigrationRunner::new(handle)
        .run()
        .await
        .expect("Failed to run test migrations");

    db
}

pub fn test_admin_config() -> AdminConfig {
    AdminConfig {
        username: "admin".to_string(),
        email: "admin@restobar.test".to_string(),
        password: Some("admin-secret".to_string()),
        password_file: std::env::temp_dir().join("restobar-unused-admin-password"),
    }
}

pub fn test_addr() -> SocketAddr {
    "127.0.0.1:3000".parse().unwrap()
}

// ============================================================================
// Recording doubles
// ============================================================================

/// Ordered log of collaborator calls shared by all doubles
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: &str) {
        self.0.lock().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().iter().filter(|c| *c == call).count()
    }

    pub fn position(&self, call: &str) -> Option<usize> {
        self.0.lock().iter().position(|c| c == call)
    }
}

/// Store whose authenticate/sync results are scripted. Once the sync script
/// is exhausted every further sync succeeds.
pub struct MockStore {
    log: CallLog,
    authenticate_error: Option<String>,
    sync_results: Mutex<VecDeque<DbErr>>,
}

impl MockStore {
    pub fn healthy(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            authenticate_error: None,
            sync_results: Mutex::new(VecDeque::new()),
        }
    }

    pub fn unreachable(log: &CallLog) -> Self {
        Self {
            authenticate_error: Some("connection refused".to_string()),
            ..Self::healthy(log)
        }
    }

    pub fn with_sync_errors(self, errors: &[&str]) -> Self {
        self.with_sync_db_errors(errors.iter().map(|e| DbErr::Custom(e.to_string())).collect())
    }

    pub fn with_sync_db_errors(self, errors: Vec<DbErr>) -> Self {
        *self.sync_results.lock() = errors.into();
        self
    }
}

#[async_trait]
impl DataStore for MockStore {
    async fn authenticate(&self) -> Result<(), DbErr> {
        self.log.push("authenticate");
        match &self.authenticate_error {
            Some(e) => Err(DbErr::Custom(e.clone())),
            None => Ok(()),
        }
    }

    async fn sync(&self, options: SyncOptions) -> Result<(), DbErr> {
        assert!(!options.structural_changes, "sync must not alter tables");
        assert!(!options.force_recreate, "sync must not drop tables");
        self.log.push("sync");
        match self.sync_results.lock().pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

pub struct MockMigrations {
    log: CallLog,
    fail: bool,
}

impl MockMigrations {
    pub fn new(log: &CallLog, fail: bool) -> Self {
        Self {
            log: log.clone(),
            fail,
        }
    }
}

#[async_trait]
impl MigrationRunner for MockMigrations {
    async fn run(&self) -> Result<(), BootstrapError> {
        self.log.push("migrate");
        if self.fail {
            return Err(BootstrapError::Migration("bad migration".to_string()));
        }
        Ok(())
    }
}

pub struct MockSeeder {
    log: CallLog,
    fail: bool,
}

impl MockSeeder {
    pub fn new(log: &CallLog, fail: bool) -> Self {
        Self {
            log: log.clone(),
            fail,
        }
    }

    fn call(&self, name: &str) -> Result<(), BootstrapError> {
        self.log.push(name);
        if self.fail {
            return Err(BootstrapError::Seed(format!("{} failed", name)));
        }
        Ok(())
    }
}

#[async_trait]
impl Seeder for MockSeeder {
    async fn seed_roles(&self) -> Result<(), BootstrapError> {
        self.call("seed_roles")
    }

    async fn ensure_admin_user(&self) -> Result<(), BootstrapError> {
        self.call("ensure_admin_user")
    }

    async fn sync_comandas(&self) -> Result<(), BootstrapError> {
        self.call("sync_comandas")
    }

    async fn sync_reservas(&self) -> Result<(), BootstrapError> {
        self.call("sync_reservas")
    }
}

pub struct MockScheduler {
    log: CallLog,
    fail: bool,
}

impl MockScheduler {
    pub fn new(log: &CallLog, fail: bool) -> Self {
        Self {
            log: log.clone(),
            fail,
        }
    }
}

impl JobScheduler for MockScheduler {
    fn start(&self) -> Result<(), BootstrapError> {
        self.log.push("scheduler_start");
        if self.fail {
            return Err(BootstrapError::SchedulerStart("no runtime".to_string()));
        }
        Ok(())
    }

    fn stop(&self) {
        self.log.push("scheduler_stop");
    }
}

/// Listener that fails its first `failures` binds
pub struct MockListener {
    log: CallLog,
    failures: Mutex<u32>,
}

impl MockListener {
    pub fn new(log: &CallLog) -> Self {
        Self::failing(log, 0)
    }

    pub fn failing(log: &CallLog, failures: u32) -> Self {
        Self {
            log: log.clone(),
            failures: Mutex::new(failures),
        }
    }
}

#[async_trait]
impl Listener for MockListener {
    async fn listen(&self, addr: SocketAddr) -> Result<ServerHandle, BootstrapError> {
        self.log.push("listen");
        let mut failures = self.failures.lock();
        if *failures > 0 {
            *failures -= 1;
            return Err(BootstrapError::ListenerBind("address in use".to_string()));
        }
        Ok(ServerHandle::detached(addr))
    }
}

/// Knobs for [`mock_bootstrapper`]
#[derive(Default)]
pub struct MockSetup {
    pub store_unreachable: bool,
    pub sync_errors: Vec<&'static str>,
    pub migrations_fail: bool,
    pub seeder_fails: bool,
    pub scheduler_fails: bool,
    pub listener_failures: u32,
}

pub fn mock_bootstrapper(setup: MockSetup, log: &CallLog) -> Bootstrapper {
    let store = if setup.store_unreachable {
        MockStore::unreachable(log)
    } else {
        MockStore::healthy(log)
    }
    .with_sync_errors(&setup.sync_errors);

    Bootstrapper::new(
        Collaborators {
            store: Arc::new(store),
            migrations: Arc::new(MockMigrations::new(log, setup.migrations_fail)),
            seeder: Arc::new(MockSeeder::new(log, setup.seeder_fails)),
            scheduler: Arc::new(MockScheduler::new(log, setup.scheduler_fails)),
            listener: Arc::new(MockListener::failing(log, setup.listener_failures)),
        },
        RetryConfig::default(),
    )
}
