//! Reference data and auxiliary tables ensured on every boot.
//!
//! Each operation checks before it writes, so running it again is a no-op.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use super::bootstrap::Seeder;
use super::security::{generate_secure_password, hash_password};
use crate::config::admin::AdminConfig;
use crate::db::{create_table_if_missing, DbConn, DbHandle};
use crate::error::BootstrapError;
use crate::models::prelude::*;
use crate::models::{role, usuario};

/// Role granted to the bootstrap administrator
pub const ADMIN_ROLE: &str = "administrador";

/// Roles every installation starts with
pub const DEFAULT_ROLES: &[(&str, &str)] = &[
    (ADMIN_ROLE, "Acceso total al sistema"),
    ("cajero", "Apertura y cierre de caja, registro de ventas"),
    ("mozo", "Toma de comandas y atencion de mesas"),
    ("cocina", "Gestion de comandas en cocina"),
];

const GENERATED_PASSWORD_LENGTH: usize = 20;

pub struct SeaOrmSeeder {
    db: DbHandle,
    admin: AdminConfig,
}

impl SeaOrmSeeder {
    pub fn new(db: DbHandle, admin: AdminConfig) -> Self {
        Self { db, admin }
    }

    fn conn(&self) -> Result<&DbConn, BootstrapError> {
        self.db.get().map_err(seed_error)
    }
}

/// Owner-only on unix
async fn write_password_file(path: &Path, password: &str) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(password.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await
}

fn seed_error(e: impl std::fmt::Display) -> BootstrapError {
    BootstrapError::Seed(e.to_string())
}

#[async_trait]
impl Seeder for SeaOrmSeeder {
    async fn seed_roles(&self) -> Result<(), BootstrapError> {
        let db = self.conn()?;
        let now = Utc::now();
        let mut created = 0;

        for (nombre, descripcion) in DEFAULT_ROLES {
            let exists = Role::find()
                .filter(role::Column::Nombre.eq(*nombre))
                .one(db)
                .await
                .map_err(seed_error)?
                .is_some();

            if exists {
                continue;
            }

            role::ActiveModel {
                nombre: Set(nombre.to_string()),
                descripcion: Set(Some(descripcion.to_string())),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await
            .map_err(seed_error)?;
            created += 1;
        }

        if created > 0 {
            tracing::info!(created, "Default roles seeded");
        }
        Ok(())
    }

    async fn ensure_admin_user(&self) -> Result<(), BootstrapError> {
        let db = self.conn()?;

        let admin_role = Role::find()
            .filter(role::Column::Nombre.eq(ADMIN_ROLE))
            .one(db)
            .await
            .map_err(seed_error)?
            .ok_or_else(|| seed_error(format!("Role '{}' not found", ADMIN_ROLE)))?;

        let admin_count = Usuario::find()
            .filter(usuario::Column::RolId.eq(admin_role.id))
            .count(db)
            .await
            .map_err(seed_error)?;
        if admin_count > 0 {
            return Ok(());
        }

        let username_taken = Usuario::find()
            .filter(usuario::Column::Username.eq(self.admin.username.as_str()))
            .one(db)
            .await
            .map_err(seed_error)?
            .is_some();
        if username_taken {
            return Err(seed_error(format!(
                "User '{}' exists without the {} role",
                self.admin.username, ADMIN_ROLE
            )));
        }

        let password = match &self.admin.password {
            Some(password) => password.clone(),
            None => {
                let generated = generate_secure_password(GENERATED_PASSWORD_LENGTH);
                write_password_file(&self.admin.password_file, &generated)
                    .await
                    .map_err(|e| {
                        seed_error(format!(
                            "Failed to write {}: {}",
                            self.admin.password_file.display(),
                            e
                        ))
                    })?;
                tracing::warn!(
                    username = %self.admin.username,
                    path = %self.admin.password_file.display(),
                    "ADMIN_PASSWORD not set, wrote a generated administrator password. Change it after first login"
                );
                generated
            }
        };
        let password_hash = hash_password(&password).map_err(seed_error)?;

        let now = Utc::now();
        usuario::ActiveModel {
            username: Set(self.admin.username.clone()),
            email: Set(self.admin.email.clone()),
            password_hash: Set(password_hash),
            rol_id: Set(admin_role.id),
            activo: Set(true),
            ultimo_acceso: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(seed_error)?;

        tracing::info!(username = %self.admin.username, "Administrator account created");
        Ok(())
    }

    async fn sync_comandas(&self) -> Result<(), BootstrapError> {
        create_table_if_missing(self.conn()?, Comanda)
            .await
            .map_err(seed_error)
    }

    async fn sync_reservas(&self) -> Result<(), BootstrapError> {
        create_table_if_missing(self.conn()?, Reserva)
            .await
            .map_err(seed_error)
    }
}
