//! Migration: Index the columns the till-closing job filters on

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_VENTAS_CAJA: &str = "idx_ventas_caja_id";
const IDX_CAJAS_ESTADO: &str = "idx_cajas_estado";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.has_table("ventas").await?
            && !manager.has_index("ventas", IDX_VENTAS_CAJA).await?
        {
            manager
                .create_index(
                    Index::create()
                        .name(IDX_VENTAS_CAJA)
                        .table(Ventas::Table)
                        .col(Ventas::CajaId)
                        .to_owned(),
                )
                .await?;
        }

        if manager.has_table("cajas").await?
            && !manager.has_index("cajas", IDX_CAJAS_ESTADO).await?
        {
            manager
                .create_index(
                    Index::create()
                        .name(IDX_CAJAS_ESTADO)
                        .table(Cajas::Table)
                        .col(Cajas::Estado)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_VENTAS_CAJA)
                    .table(Ventas::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_CAJAS_ESTADO)
                    .table(Cajas::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Ventas {
    Table,
    #[iden = "caja_id"]
    CajaId,
}

#[derive(Iden)]
enum Cajas {
    Table,
    Estado,
}
