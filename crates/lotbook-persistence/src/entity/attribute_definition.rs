//! `SeaORM` Entity for attribute_definition table
//!
//! A named attribute managed by schema administrators. The `key` column is
//! derived from `name` by normalization and is what item documents index by.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "attribute_definition")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human label, unique
    #[sea_orm(unique)]
    pub name: String,
    /// Normalized key derived from the name, unique
    #[sea_orm(unique)]
    pub key: String,
    /// Unit of measure for the attribute value (e.g. "cSt", "°C")
    pub unit: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::category_attribute_link::Entity")]
    CategoryAttributeLink,
}

impl Related<super::category_attribute_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CategoryAttributeLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
