use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ventas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub caja_id: i32,
    /// Sale total, in cents
    pub total: i64,
    #[sea_orm(default_value = "efectivo")]
    pub metodo_pago: String,
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
