use std::env;
use std::time::Duration;

/// Retry budget for the schema synchronizer
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub sync_retries: u32,
    pub sync_delay: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            sync_retries: 3,
            sync_delay: Duration::from_millis(2000),
        }
    }
}

impl BootstrapConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sync_retries: env::var("BOOTSTRAP_SYNC_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &u32| *n > 0)
                .unwrap_or(defaults.sync_retries),
            sync_delay: env::var("BOOTSTRAP_SYNC_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.sync_delay),
        }
    }
}
