//! Migration: Add metodo_pago column to ventas table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_table("ventas").await?
            || manager.has_column("ventas", "metodo_pago").await?
        {
            return Ok(());
        }

        manager
            .alter_table(
                Table::alter()
                    .table(Ventas::Table)
                    .add_column(
                        ColumnDef::new(Ventas::MetodoPago)
                            .string()
                            .not_null()
                            .default("efectivo"),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Ventas::Table)
                    .drop_column(Ventas::MetodoPago)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "ventas"]
enum Ventas {
    Table,
    #[iden = "metodo_pago"]
    MetodoPago,
}
