use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const ESTADO_ABIERTA: &str = "abierta";
pub const ESTADO_CERRADA: &str = "cerrada";

/// A till session, from opening float to closing
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cajas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub usuario_id: Option<i32>,
    /// Opening float, in cents
    pub monto_inicial: i64,
    pub estado: String, // 'abierta', 'cerrada'
    pub abierta_at: DateTimeUtc,
    pub cerrada_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::venta::Entity")]
    Ventas,
    #[sea_orm(has_many = "super::cierre_caja::Entity")]
    Cierres,
}

impl Related<super::venta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ventas.def()
    }
}

impl Related<super::cierre_caja::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cierres.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
