use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use super::BootstrapState;
use crate::error::BootstrapError;

/// Report shared with the HTTP surface
pub type SharedReport = Arc<RwLock<BootstrapReport>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    Failed(BootstrapError),
    /// Not attempted because an earlier fatal step failed
    Skipped,
}

impl StepStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed(_) => "failed",
            StepStatus::Skipped => "skipped",
        }
    }
}

/// Outcome of one startup step
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub name: &'static str,
    pub target: BootstrapState,
    pub status: StepStatus,
    pub attempts: u32,
    pub elapsed: Duration,
}

impl Serialize for StepRecord {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let error = match &self.status {
            StepStatus::Failed(e) => Some(e),
            _ => None,
        };

        let mut st = s.serialize_struct("StepRecord", 7)?;
        st.serialize_field("name", self.name)?;
        st.serialize_field("target", &self.target)?;
        st.serialize_field("status", self.status.label())?;
        st.serialize_field("error_kind", &error.map(|e| e.kind()))?;
        st.serialize_field("error", &error.map(|e| e.message()))?;
        st.serialize_field("attempts", &self.attempts)?;
        st.serialize_field("elapsed_ms", &(self.elapsed.as_millis() as u64))?;
        st.end()
    }
}

/// Aggregated result of a startup sequence
#[derive(Debug, Clone, Default, Serialize)]
pub struct BootstrapReport {
    state: BootstrapState,
    steps: Vec<StepRecord>,
    /// Name of the fatal step that cut the sequence short, if any
    aborted_at: Option<&'static str>,
}

impl BootstrapReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn step(&self, name: &str) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn aborted_at(&self) -> Option<&'static str> {
        self.aborted_at
    }

    /// Record a step outcome. The sequence advances to the step's target even
    /// when the step failed; state never moves backwards.
    pub fn record(&mut self, record: StepRecord) {
        if !matches!(record.status, StepStatus::Skipped) && record.target > self.state {
            self.state = record.target;
        }
        self.steps.push(record);
    }

    pub fn mark_aborted(&mut self, step: &'static str) {
        self.aborted_at = Some(step);
    }

    pub fn mark_listening(&mut self) {
        self.state = BootstrapState::Listening;
    }

    /// Steps that failed, in execution order
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &BootstrapError)> {
        self.steps.iter().filter_map(|s| match &s.status {
            StepStatus::Failed(e) => Some((s.name, e)),
            _ => None,
        })
    }

    /// True when any step failed or was skipped
    pub fn is_degraded(&self) -> bool {
        self.steps
            .iter()
            .any(|s| !matches!(s.status, StepStatus::Succeeded))
    }

    /// Emit the one summary line for the whole sequence plus one line per failure
    pub fn log_summary(&self) {
        let total = self.steps.len();
        let failed = self.failures().count();

        if !self.is_degraded() {
            tracing::info!(steps = total, "Bootstrap completed, all steps succeeded");
            return;
        }

        for (step, error) in self.failures() {
            tracing::warn!(step, kind = error.kind(), error = %error, "Bootstrap step failed");
        }
        if let Some(step) = self.aborted_at {
            tracing::error!(step, "Fatal bootstrap step failed, remaining steps were skipped");
        }
        tracing::warn!(
            steps = total,
            failed,
            "Bootstrap completed with errors, service is running degraded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &'static str, target: BootstrapState, status: StepStatus) -> StepRecord {
        StepRecord {
            name,
            target,
            status,
            attempts: 1,
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_failed_step_still_advances_state() {
        let mut report = BootstrapReport::new();
        report.record(record(
            "connect",
            BootstrapState::DbConnected,
            StepStatus::Failed(BootstrapError::Connection("refused".into())),
        ));

        assert_eq!(report.state(), BootstrapState::DbConnected);
        assert!(report.is_degraded());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_state_never_moves_backwards() {
        let mut report = BootstrapReport::new();
        report.record(record(
            "migrate",
            BootstrapState::Migrated,
            StepStatus::Succeeded,
        ));
        report.record(record(
            "connect",
            BootstrapState::DbConnected,
            StepStatus::Succeeded,
        ));

        assert_eq!(report.state(), BootstrapState::Migrated);
    }

    #[test]
    fn test_skipped_steps_do_not_advance() {
        let mut report = BootstrapReport::new();
        report.record(record(
            "start_scheduler",
            BootstrapState::SchedulerStarted,
            StepStatus::Skipped,
        ));

        assert_eq!(report.state(), BootstrapState::NotStarted);
        assert!(report.is_degraded());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = BootstrapReport::new();
        report.record(record(
            "seed_roles",
            BootstrapState::Seeded,
            StepStatus::Failed(BootstrapError::Seed("no table".into())),
        ));
        report.mark_listening();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["state"], "listening");
        assert_eq!(json["steps"][0]["name"], "seed_roles");
        assert_eq!(json["steps"][0]["status"], "failed");
        assert_eq!(json["steps"][0]["error_kind"], "seed_error");
        assert_eq!(json["steps"][0]["error"], "no table");
        assert_eq!(json["steps"][0]["elapsed_ms"], 5);
        assert!(json["aborted_at"].is_null());
    }
}
