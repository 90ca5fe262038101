use crate::db::DbHandle;
use crate::services::bootstrap::SharedReport;

/// Application state shared with request handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DbHandle,
    pub bootstrap_report: SharedReport,
}

impl AppState {
    pub fn new(db: DbHandle, bootstrap_report: SharedReport) -> Self {
        Self {
            db,
            bootstrap_report,
        }
    }
}
