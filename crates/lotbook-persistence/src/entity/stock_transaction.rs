//! `SeaORM` Entity for stock_transaction table
//!
//! Immutable ledger rows. A purchase emits one row; a usage emits one row
//! per batch it drained, each carrying its own `source_batch_id`. For any
//! `(item_id, facility_id)` the sum of `quantity_change` over all rows
//! equals the sum of open batch quantities.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction kind stored as a short string column
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionType {
    #[sea_orm(string_value = "PURCHASE")]
    Purchase,
    #[sea_orm(string_value = "USAGE")]
    Usage,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_transaction")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_id: i64,
    pub facility_id: i64,
    pub transaction_type: TransactionType,
    /// Signed quantity: positive inbound, negative outbound
    #[sea_orm(column_type = "Decimal(Some((16, 6)))")]
    pub quantity_change: Decimal,
    pub transaction_date: DateTimeUtc,
    /// Opaque user identity of the actor, when known
    pub performed_by: Option<i64>,
    /// The batch this specific row affected, always populated
    pub source_batch_id: i64,
    /// Unit cost at receipt, purchase rows only
    #[sea_orm(column_type = "Decimal(Some((16, 6)))", nullable)]
    pub unit_cost: Option<Decimal>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
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
        belongs_to = "super::batch::Entity",
        from = "Column::SourceBatchId",
        to = "super::batch::Column::Id"
    )]
    Batch,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
