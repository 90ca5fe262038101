use std::env;

/// Settings for the daily till-closing job
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Local wall-clock time, `HH:MM`
    pub cierre_hora: String,
    /// Offset of local time from UTC, in minutes (Lima is -300)
    pub utc_offset_minutes: i32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cierre_hora: "23:59".to_string(),
            utc_offset_minutes: -300,
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env::var("CIERRE_CAJA_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(defaults.enabled),
            cierre_hora: env::var("CIERRE_CAJA_HORA").unwrap_or(defaults.cierre_hora),
            utc_offset_minutes: env::var("CIERRE_CAJA_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.utc_offset_minutes),
        }
    }
}
