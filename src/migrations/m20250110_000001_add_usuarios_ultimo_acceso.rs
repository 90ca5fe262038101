//! Migration: Add ultimo_acceso column to usuarios table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Fresh databases get the column from schema sync
        if !manager.has_table("usuarios").await?
            || manager.has_column("usuarios", "ultimo_acceso").await?
        {
            return Ok(());
        }

        manager.alter_table(add_ultimo_acceso()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Usuarios::Table)
                    .drop_column(Usuarios::UltimoAcceso)
                    .to_owned(),
            )
            .await
    }
}

/// Same column type the entity's `DateTimeUtc` maps to
fn add_ultimo_acceso() -> TableAlterStatement {
    Table::alter()
        .table(Usuarios::Table)
        .add_column(
            ColumnDef::new(Usuarios::UltimoAcceso)
                .timestamp_with_time_zone()
                .null(),
        )
        .to_owned()
}

#[derive(Iden)]
#[iden = "usuarios"]
enum Usuarios {
    Table,
    #[iden = "ultimo_acceso"]
    UltimoAcceso,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ultimo_acceso_is_timezone_aware_on_postgres() {
        let sql = add_ultimo_acceso().to_string(PostgresQueryBuilder);
        assert!(sql.contains("timestamp with time zone"), "{}", sql);
    }
}
