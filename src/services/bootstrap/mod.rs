//! Startup sequencing
//!
//! The backend comes online through an ordered list of steps: connect, sync
//! schema, migrate, seed, start the scheduler, and finally bind the listener.
//! Every step before the listener is allowed to fail; failures are collected
//! in a [`BootstrapReport`] instead of aborting startup.

pub mod report;
pub mod sequencer;

pub use report::{BootstrapReport, SharedReport, StepRecord, StepStatus};
pub use sequencer::{default_steps, BootstrapRun, Bootstrapper, Collaborators, Step, StepKind};

use std::net::SocketAddr;

use async_trait::async_trait;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::error::BootstrapError;

/// Progress of the startup sequence. Only ever moves forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapState {
    #[default]
    NotStarted,
    DbConnected,
    SchemaSynced,
    Migrated,
    Seeded,
    AdminEnsured,
    AuxTablesSynced,
    SchedulerStarted,
    Listening,
}

/// Options passed to [`DataStore::sync`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Allow ALTERs on existing tables
    pub structural_changes: bool,
    /// Drop and recreate declared tables
    pub force_recreate: bool,
}

/// The backing store, as seen by the connect step and schema sync
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn authenticate(&self) -> Result<(), DbErr>;

    async fn sync(&self, options: SyncOptions) -> Result<(), DbErr>;
}

/// Applies pending structural migrations
#[async_trait]
pub trait MigrationRunner: Send + Sync {
    async fn run(&self) -> Result<(), BootstrapError>;
}

/// Idempotent reference-data steps
#[async_trait]
pub trait Seeder: Send + Sync {
    async fn seed_roles(&self) -> Result<(), BootstrapError>;

    async fn ensure_admin_user(&self) -> Result<(), BootstrapError>;

    async fn sync_comandas(&self) -> Result<(), BootstrapError>;

    async fn sync_reservas(&self) -> Result<(), BootstrapError>;
}

/// Lifecycle of the recurring background jobs
pub trait JobScheduler: Send + Sync {
    fn start(&self) -> Result<(), BootstrapError>;

    /// Stop all running jobs. Safe to call when not running.
    fn stop(&self);
}

/// Binds the network listener and starts serving
#[async_trait]
pub trait Listener: Send + Sync {
    async fn listen(&self, addr: SocketAddr) -> Result<ServerHandle, BootstrapError>;
}

/// A bound listener and the task serving it
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl ServerHandle {
    pub fn new(local_addr: SocketAddr, task: JoinHandle<std::io::Result<()>>) -> Self {
        Self {
            local_addr,
            task: Some(task),
        }
    }

    /// A handle with no serving task, for listeners that serve elsewhere
    pub fn detached(local_addr: SocketAddr) -> Self {
        Self {
            local_addr,
            task: None,
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait until the server stops
    pub async fn wait(self) -> std::io::Result<()> {
        match self.task {
            Some(task) => task.await.map_err(std::io::Error::other)?,
            None => Ok(()),
        }
    }
}
