//! `SeaORM` Entity for batch table
//!
//! One lot of physical stock. Created only by a purchase; `quantity` is
//! decremented only by FIFO consumption and never drops below zero. Depleted
//! batches stay as ledger records and are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "batch")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_id: i64,
    pub facility_id: i64,
    /// Remaining quantity, >= 0 at all times
    #[sea_orm(column_type = "Decimal(Some((16, 6)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 6)))", nullable)]
    pub unit_cost: Option<Decimal>,
    pub received_date: DateTimeUtc,
    /// Supplying vendor, when known
    pub source_id: Option<i64>,
    pub lot_number: Option<String>,
    pub expiration_date: Option<Date>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
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
    #[sea_orm(
        belongs_to = "super::facility::Entity",
        from = "Column::FacilityId",
        to = "super::facility::Column::Id"
    )]
    Facility,
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::SourceId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    #[sea_orm(has_many = "super::stock_transaction::Entity")]
    StockTransaction,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::facility::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Facility.def()
    }
}

impl Related<super::stock_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
