//! `SeaORM` Entity for item_category table
//!
//! Categories anchor which attribute definitions apply to an item and are
//! the scope unit for schema propagation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "item_category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable category code, unique
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::item::Entity")]
    Item,
    #[sea_orm(has_many = "super::category_attribute_link::Entity")]
    CategoryAttributeLink,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::category_attribute_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CategoryAttributeLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
