//! `SeaORM` Entity for attribute_document table
//!
//! Exactly one document per item. The `attributes` JSON column holds the
//! flat key → nullable scalar map; its valid key set is derived from the
//! item's category links and enforced at the service boundary.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::value::AttributeMap;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attribute_document")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub item_id: i64,
    #[sea_orm(column_type = "Json")]
    pub attributes: AttributeMap,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
