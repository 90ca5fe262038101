pub mod bootstrap;
pub mod cierre;
pub mod migration;
pub mod retry;
pub mod scheduler;
pub mod schema_sync;
pub mod security;
pub mod seed;

pub use bootstrap::{BootstrapReport, BootstrapState, Bootstrapper};
pub use migration::SeaOrmMigrationRunner;
pub use scheduler::TaskScheduler;
pub use schema_sync::SchemaSynchronizer;
pub use seed::SeaOrmSeeder;
