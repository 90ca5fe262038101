//! Periodic task scheduler
//!
//! A simple scheduler for running background tasks on their own schedule.
//! Add new tasks by implementing the `PeriodicTask` trait. The scheduler is
//! an explicit handle: nothing runs until `start()` and `stop()` cancels
//! every spawned loop.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::bootstrap::JobScheduler;
use super::cierre::CierreCajaTask;
use crate::config::scheduler::SchedulerConfig;
use crate::db::{DbConn, DbHandle};
use crate::error::BootstrapError;

/// Trait for periodic background tasks
#[async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Task name for logging
    fn name(&self) -> &'static str;

    /// How long to wait, from `now`, before the next run
    fn next_run_in(&self, now: DateTime<Utc>) -> Duration;

    /// Execute the task
    async fn run(&self, db: &DbConn) -> anyhow::Result<()>;
}

/// Builds the task list when the scheduler starts, so that invalid task
/// configuration surfaces as a start failure
type TaskFactory = Box<dyn Fn() -> Result<Vec<Arc<dyn PeriodicTask>>, String> + Send + Sync>;

struct Running {
    token: CancellationToken,
    tracker: TaskTracker,
}

pub struct TaskScheduler {
    db: DbHandle,
    enabled: bool,
    factory: TaskFactory,
    running: Mutex<Option<Running>>,
}

impl TaskScheduler {
    pub fn new(
        db: DbHandle,
        factory: impl Fn() -> Result<Vec<Arc<dyn PeriodicTask>>, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            db,
            enabled: true,
            factory: Box::new(factory),
            running: Mutex::new(None),
        }
    }

    /// Scheduler running the daily till-closing task
    pub fn cierre_caja(db: DbHandle, config: SchedulerConfig) -> Self {
        let enabled = config.enabled;
        let mut scheduler = Self::new(db, move || {
            let task = CierreCajaTask::from_config(&config)?;
            Ok(vec![Arc::new(task) as Arc<dyn PeriodicTask>])
        });
        scheduler.enabled = enabled;
        scheduler
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Stop and wait for every task loop to exit
    pub async fn shutdown(&self) {
        let running = self.running.lock().take();
        if let Some(running) = running {
            running.token.cancel();
            running.tracker.close();
            running.tracker.wait().await;
            tracing::info!("Periodic task scheduler stopped");
        }
    }
}

impl JobScheduler for TaskScheduler {
    fn start(&self) -> Result<(), BootstrapError> {
        if !self.enabled {
            tracing::info!("Periodic task scheduler disabled by configuration");
            return Ok(());
        }

        let mut running = self.running.lock();
        if running.is_some() {
            return Err(BootstrapError::SchedulerStart(
                "Scheduler is already running".to_string(),
            ));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| BootstrapError::SchedulerStart(e.to_string()))?;
        let db = self
            .db
            .get()
            .map_err(|e| BootstrapError::SchedulerStart(e.to_string()))?
            .clone();
        let tasks = (self.factory)().map_err(BootstrapError::SchedulerStart)?;

        let token = CancellationToken::new();
        let tracker = TaskTracker::new();
        for task in tasks {
            tracker.spawn_on(run_task(task, db.clone(), token.child_token()), &runtime);
        }

        *running = Some(Running { token, tracker });
        tracing::info!("Periodic task scheduler started");
        Ok(())
    }

    fn stop(&self) {
        if let Some(running) = self.running.lock().take() {
            running.token.cancel();
            running.tracker.close();
            tracing::info!("Periodic task scheduler stopping");
        }
    }
}

/// Run a single task on its schedule until cancelled
async fn run_task(task: Arc<dyn PeriodicTask>, db: DbConn, token: CancellationToken) {
    loop {
        let delay = task.next_run_in(Utc::now());
        tracing::debug!(task = task.name(), ?delay, "Next periodic run scheduled");

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        tracing::debug!(task = task.name(), "Running periodic task");

        match task.run(&db).await {
            Ok(()) => {
                tracing::debug!(task = task.name(), "Periodic task completed");
            }
            Err(e) => {
                tracing::error!(task = task.name(), error = %e, "Periodic task failed");
            }
        }
    }
}
