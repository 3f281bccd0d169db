//! Attribute document service (user edits)
//!
//! User edits are validated against the category's current key set and use
//! read-modify-write with a conflict guard: the merged map is stored through
//! a conditional update on the `updated_at` observed at fetch time, so a
//! propagation job committing inside the fetch-to-store window is never
//! blindly overwritten — the edit re-fetches, re-merges, and retries. A null
//! value in a patch stores null under the key; key lifecycle belongs to the
//! schema, not to value edits.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use lotbook_common::LedgerError;
use lotbook_persistence::entity::{attribute_document, item};
use lotbook_persistence::value::AttributeMap;

use super::link;

/// Re-merges before a concurrent document writer surfaces as a conflict
const DOCUMENT_WRITE_ATTEMPTS: u32 = 3;

pub async fn get_for_item(
    db: &DatabaseConnection,
    item_id: i64,
) -> anyhow::Result<Option<attribute_document::Model>> {
    Ok(attribute_document::Entity::find()
        .filter(attribute_document::Column::ItemId.eq(item_id))
        .one(db)
        .await?)
}

/// Merge a user patch into the item's document
///
/// Every patch key must be valid for the item's category; unknown keys are
/// rejected by name before any write. An item without a document (possible
/// when it predates document backfill) gets one created from the current
/// category keys plus the patch.
pub async fn update_attributes(
    db: &DatabaseConnection,
    item_id: i64,
    patch: &AttributeMap,
) -> anyhow::Result<attribute_document::Model> {
    let item = item::Entity::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found("item", item_id))?;

    let valid_keys = link::definition_keys_for_category(db, item.category_id).await?;
    for key in patch.keys() {
        if !valid_keys.iter().any(|k| k == key) {
            return Err(LedgerError::invalid(format!(
                "unknown attribute key '{}' for category {}",
                key, item.category_id
            ))
            .into());
        }
    }

    for _attempt in 1..=DOCUMENT_WRITE_ATTEMPTS {
        match get_for_item(db, item_id).await? {
            Some(document) => {
                let mut attributes = document.attributes.clone();
                for (key, value) in patch.iter() {
                    attributes.insert(key.clone(), value.clone());
                }

                if try_store(db, &document, attributes).await? {
                    let stored = get_for_item(db, item_id)
                        .await?
                        .ok_or_else(|| LedgerError::not_found("attribute document", item_id))?;
                    return Ok(stored);
                }
                // a propagation job committed between fetch and store;
                // re-fetch and merge onto its result
            }
            None => {
                let mut attributes = AttributeMap::from_null_keys(valid_keys.clone());
                for (key, value) in patch.iter() {
                    attributes.insert(key.clone(), value.clone());
                }

                let now = Utc::now();
                let stored = attribute_document::ActiveModel {
                    item_id: Set(item_id),
                    attributes: Set(attributes),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(db)
                .await?;
                return Ok(stored);
            }
        }
    }

    Err(LedgerError::ConcurrencyConflict(format!(
        "attribute document for item {} kept changing during edit",
        item_id
    ))
    .into())
}

/// Store the merged map iff the row still carries the observed `updated_at`
///
/// A false return means another writer committed in between; the caller
/// re-fetches and merges again.
async fn try_store(
    db: &DatabaseConnection,
    document: &attribute_document::Model,
    attributes: AttributeMap,
) -> anyhow::Result<bool> {
    let result = attribute_document::Entity::update_many()
        .col_expr(attribute_document::Column::Attributes, Expr::value(attributes))
        .col_expr(attribute_document::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(attribute_document::Column::Id.eq(document.id))
        .filter(attribute_document::Column::UpdatedAt.eq(document.updated_at))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}
