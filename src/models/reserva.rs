use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cliente: String,
    pub telefono: Option<String>,
    pub fecha: DateTimeUtc,
    pub personas: i32,
    pub estado: String, // 'confirmada', 'cancelada', 'atendida'
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
