use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kitchen order ticket
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comandas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub mesa: String,
    pub estado: String, // 'pendiente', 'en_preparacion', 'servida'
    pub detalle: Option<String>, // JSON string of ordered items
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
