use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cierres_caja")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub caja_id: i32,
    pub total_ventas: i64,
    pub cantidad_ventas: i32,
    /// Opening float plus sales, in cents
    pub monto_final: i64,
    /// Closed by the scheduler rather than by a cashier
    pub automatico: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::caja::Entity",
        from = "Column::CajaId",
        to = "super::caja::Column::Id"
    )]
    Caja,
}

impl Related<super::caja::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Caja.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
