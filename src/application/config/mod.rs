pub mod admin;
pub mod bootstrap;
pub mod database;
pub mod scheduler;
pub mod server;

use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub bootstrap: bootstrap::BootstrapConfig,
    pub admin: admin::AdminConfig,
    pub scheduler: scheduler::SchedulerConfig,

    // Build info
    pub version: String,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: server::ServerConfig::from_env(),
            database: database::DatabaseConfig::from_env(),
            bootstrap: bootstrap::BootstrapConfig::from_env(),
            admin: admin::AdminConfig::from_env(),
            scheduler: scheduler::SchedulerConfig::from_env(),

            // Build info
            version: env!("CARGO_PKG_VERSION").to_string(),

            // Logging
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    // A missing .env is the normal case in containers
    let _ = dotenvy::dotenv();
    Config::from_env()
});
