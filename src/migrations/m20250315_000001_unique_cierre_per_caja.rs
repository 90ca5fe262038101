//! Migration: At most one cierre per caja

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_CIERRES_CAJA: &str = "idx_cierres_caja_caja_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.has_table("cierres_caja").await?
            && !manager.has_index("cierres_caja", IDX_CIERRES_CAJA).await?
        {
            manager
                .create_index(
                    Index::create()
                        .name(IDX_CIERRES_CAJA)
                        .table(CierresCaja::Table)
                        .col(CierresCaja::CajaId)
                        .unique()
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
                    .name(IDX_CIERRES_CAJA)
                    .table(CierresCaja::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum CierresCaja {
    Table,
    #[iden = "caja_id"]
    CajaId,
}
