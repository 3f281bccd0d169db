//! Item service
//!
//! Item creation pre-populates the attribute document with every key
//! currently linked to the item's category, all null, in the same
//! transaction as the item row.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use lotbook_common::LedgerError;
use lotbook_persistence::entity::{attribute_document, item, item_category};
use lotbook_persistence::value::AttributeMap;

use super::link;

/// Parameters for creating an item
#[derive(Clone, Debug)]
pub struct CreateItemParams {
    pub code: String,
    pub name: String,
    pub category_id: i64,
    pub unit_of_measure: String,
    pub notes: Option<String>,
}

pub async fn create(
    db: &DatabaseConnection,
    params: CreateItemParams,
) -> anyhow::Result<item::Model> {
    if params.code.trim().is_empty() {
        return Err(LedgerError::invalid("item code must not be empty").into());
    }

    item_category::Entity::find_by_id(params.category_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found("category", params.category_id))?;

    let existing = item::Entity::find()
        .filter(item::Column::Code.eq(&params.code))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(
            LedgerError::invalid(format!("item '{}' already exists", params.code)).into(),
        );
    }

    let keys = link::definition_keys_for_category(db, params.category_id).await?;

    let now = Utc::now();
    let txn = db.begin().await?;

    let created = item::ActiveModel {
        code: Set(params.code),
        name: Set(params.name),
        category_id: Set(params.category_id),
        unit_of_measure: Set(params.unit_of_measure),
        notes: Set(params.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    attribute_document::ActiveModel {
        item_id: Set(created.id),
        attributes: Set(AttributeMap::from_null_keys(keys)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(created)
}

pub async fn get_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> anyhow::Result<Option<item::Model>> {
    Ok(item::Entity::find()
        .filter(item::Column::Code.eq(code))
        .one(db)
        .await?)
}

pub async fn find_by_category(
    db: &DatabaseConnection,
    category_id: i64,
) -> anyhow::Result<Vec<item::Model>> {
    Ok(item::Entity::find()
        .filter(item::Column::CategoryId.eq(category_id))
        .order_by_asc(item::Column::Id)
        .all(db)
        .await?)
}
