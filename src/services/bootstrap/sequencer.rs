use std::any::Any;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use tokio::sync::RwLock;

use super::report::{BootstrapReport, SharedReport, StepRecord, StepStatus};
use super::{BootstrapState, DataStore, JobScheduler, Listener, MigrationRunner, Seeder, ServerHandle};
use crate::error::BootstrapError;
use crate::services::retry::RetryConfig;
use crate::services::schema_sync::SchemaSynchronizer;

/// What a step does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Connect,
    SyncSchema,
    Migrate,
    SeedRoles,
    EnsureAdmin,
    SyncComandas,
    SyncReservas,
    StartScheduler,
}

impl StepKind {
    /// Error of this step's kind, used when the step panicked
    fn failure(self, message: String) -> BootstrapError {
        match self {
            StepKind::Connect => BootstrapError::Connection(message),
            StepKind::SyncSchema | StepKind::Migrate => BootstrapError::Migration(message),
            StepKind::SeedRoles
            | StepKind::EnsureAdmin
            | StepKind::SyncComandas
            | StepKind::SyncReservas => BootstrapError::Seed(message),
            StepKind::StartScheduler => BootstrapError::SchedulerStart(message),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    format!("panicked: {}", detail)
}

/// One entry of the startup sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub name: &'static str,
    pub target: BootstrapState,
    /// A failing fatal step skips every later step (the listener still binds)
    pub fatal: bool,
    pub kind: StepKind,
}

impl Step {
    pub const fn new(name: &'static str, target: BootstrapState, kind: StepKind) -> Self {
        Self {
            name,
            target,
            fatal: false,
            kind,
        }
    }

    pub const fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }
}

/// The production order. Later steps assume earlier ones have had a chance
/// to run, not that they succeeded.
pub fn default_steps() -> Vec<Step> {
    use BootstrapState as S;
    use StepKind as K;

    vec![
        Step::new("connect", S::DbConnected, K::Connect),
        Step::new("sync_schema", S::SchemaSynced, K::SyncSchema),
        Step::new("migrate", S::Migrated, K::Migrate),
        Step::new("seed_roles", S::Seeded, K::SeedRoles),
        Step::new("ensure_admin", S::AdminEnsured, K::EnsureAdmin),
        Step::new("sync_comandas", S::AuxTablesSynced, K::SyncComandas),
        Step::new("sync_reservas", S::AuxTablesSynced, K::SyncReservas),
        Step::new("start_scheduler", S::SchedulerStarted, K::StartScheduler),
    ]
}

/// Everything the sequence talks to
pub struct Collaborators {
    pub store: Arc<dyn DataStore>,
    pub migrations: Arc<dyn MigrationRunner>,
    pub seeder: Arc<dyn Seeder>,
    pub scheduler: Arc<dyn JobScheduler>,
    pub listener: Arc<dyn Listener>,
}

/// Result of a completed startup
pub struct BootstrapRun {
    pub report: BootstrapReport,
    pub server: ServerHandle,
}

pub struct Bootstrapper {
    store: Arc<dyn DataStore>,
    synchronizer: SchemaSynchronizer,
    migrations: Arc<dyn MigrationRunner>,
    seeder: Arc<dyn Seeder>,
    scheduler: Arc<dyn JobScheduler>,
    listener: Arc<dyn Listener>,
    steps: Vec<Step>,
    report: SharedReport,
}

impl Bootstrapper {
    pub fn new(collaborators: Collaborators, retry: RetryConfig) -> Self {
        let synchronizer = SchemaSynchronizer::new(collaborators.store.clone(), retry);
        Self {
            store: collaborators.store,
            synchronizer,
            migrations: collaborators.migrations,
            seeder: collaborators.seeder,
            scheduler: collaborators.scheduler,
            listener: collaborators.listener,
            steps: default_steps(),
            report: Arc::new(RwLock::new(BootstrapReport::new())),
        }
    }

    /// Replace the step list
    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    /// Publish progress into an externally owned report
    pub fn with_report(mut self, report: SharedReport) -> Self {
        self.report = report;
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn report_handle(&self) -> SharedReport {
        self.report.clone()
    }

    /// The scheduler handle, kept so the owner can stop it on shutdown
    pub fn scheduler(&self) -> Arc<dyn JobScheduler> {
        self.scheduler.clone()
    }

    /// Run every step, then bind the listener.
    ///
    /// Only a listener that fails to bind twice in a row is returned as an
    /// error.
    pub async fn start(&self, addr: SocketAddr) -> Result<BootstrapRun, BootstrapError> {
        let report = self.run_steps().await;
        report.log_summary();
        *self.report.write().await = report;

        let server = self.activate_listener(addr).await?;

        let mut report = self.report.write().await;
        report.mark_listening();
        tracing::info!("Listening on {}", server.local_addr());

        Ok(BootstrapRun {
            report: report.clone(),
            server,
        })
    }

    /// Execute the step list in order, awaiting each step before the next
    pub async fn run_steps(&self) -> BootstrapReport {
        let mut report = BootstrapReport::new();

        for step in &self.steps {
            if report.aborted_at().is_some() {
                report.record(StepRecord {
                    name: step.name,
                    target: step.target,
                    status: StepStatus::Skipped,
                    attempts: 0,
                    elapsed: Default::default(),
                });
                continue;
            }

            tracing::debug!(step = step.name, "Running bootstrap step");
            let started = Instant::now();
            let (result, attempts) = match AssertUnwindSafe(self.execute(step.kind))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(step = step.name, error = %message, "Bootstrap step panicked");
                    (Err(step.kind.failure(message)), 1)
                }
            };
            let elapsed = started.elapsed();

            let status = match result {
                Ok(()) => {
                    tracing::debug!(step = step.name, ?elapsed, "Bootstrap step succeeded");
                    StepStatus::Succeeded
                }
                Err(e) => {
                    if step.fatal {
                        report.mark_aborted(step.name);
                    }
                    StepStatus::Failed(e)
                }
            };

            report.record(StepRecord {
                name: step.name,
                target: step.target,
                status,
                attempts,
                elapsed,
            });
        }

        report
    }

    async fn execute(&self, kind: StepKind) -> (Result<(), BootstrapError>, u32) {
        match kind {
            StepKind::Connect => {
                let result = self
                    .store
                    .authenticate()
                    .await
                    .map_err(|e| BootstrapError::Connection(e.to_string()));
                (result, 1)
            }
            StepKind::SyncSchema => {
                let outcome = self.synchronizer.run().await;
                let attempts = outcome.attempts;
                (outcome.into_result(), attempts)
            }
            StepKind::Migrate => (self.migrations.run().await, 1),
            StepKind::SeedRoles => (self.seeder.seed_roles().await, 1),
            StepKind::EnsureAdmin => (self.seeder.ensure_admin_user().await, 1),
            StepKind::SyncComandas => (self.seeder.sync_comandas().await, 1),
            StepKind::SyncReservas => (self.seeder.sync_reservas().await, 1),
            StepKind::StartScheduler => (self.scheduler.start(), 1),
        }
    }

    /// Bind once; on failure log and try exactly one more time
    async fn activate_listener(&self, addr: SocketAddr) -> Result<ServerHandle, BootstrapError> {
        match self.listen(addr).await {
            Ok(server) => Ok(server),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Listener failed to bind, continuing with initialization errors"
                );
                self.listen(addr).await
            }
        }
    }

    async fn listen(&self, addr: SocketAddr) -> Result<ServerHandle, BootstrapError> {
        AssertUnwindSafe(self.listener.listen(addr))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(BootstrapError::ListenerBind(panic_message(payload.as_ref())))
            })
    }
}
