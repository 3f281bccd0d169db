//! Attribute definition service
//!
//! Renames and deletions commit the definitional change first, then trigger
//! document propagation scoped to the categories linked at mutation time.
//! Propagation transport (broker vs inline) never blocks the definitional
//! commit itself.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use lotbook_common::{LedgerError, normalize_key};
use lotbook_persistence::entity::{attribute_definition, category_attribute_link};
use lotbook_queue::{Job, JobQueue};

use super::{scope_has_items, trigger_propagation};

pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    unit: Option<&str>,
    description: Option<&str>,
) -> anyhow::Result<attribute_definition::Model> {
    let key = normalize_key(name);
    if key.is_empty() {
        return Err(LedgerError::invalid(format!(
            "attribute name '{}' normalizes to an empty key",
            name
        ))
        .into());
    }

    let existing = attribute_definition::Entity::find()
        .filter(
            Condition::any()
                .add(attribute_definition::Column::Name.eq(name))
                .add(attribute_definition::Column::Key.eq(&key)),
        )
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(LedgerError::invalid(format!(
            "attribute definition '{}' already exists",
            name
        ))
        .into());
    }

    let now = Utc::now();
    let definition = attribute_definition::ActiveModel {
        name: Set(name.to_string()),
        key: Set(key),
        unit: Set(unit.map(str::to_string)),
        description: Set(description.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(definition)
}

pub async fn get_by_id(
    db: &DatabaseConnection,
    definition_id: i64,
) -> anyhow::Result<Option<attribute_definition::Model>> {
    Ok(attribute_definition::Entity::find_by_id(definition_id)
        .one(db)
        .await?)
}

pub async fn find_all(
    db: &DatabaseConnection,
) -> anyhow::Result<Vec<attribute_definition::Model>> {
    Ok(attribute_definition::Entity::find()
        .order_by_asc(attribute_definition::Column::Key)
        .all(db)
        .await?)
}

/// Rename a definition; when the derived key changes, every linked
/// category's documents get the old key moved to the new one
pub async fn rename(
    db: &DatabaseConnection,
    queue: &dyn JobQueue,
    definition_id: i64,
    new_name: &str,
) -> anyhow::Result<attribute_definition::Model> {
    let definition = attribute_definition::Entity::find_by_id(definition_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found("attribute definition", definition_id))?;

    let new_key = normalize_key(new_name);
    if new_key.is_empty() {
        return Err(LedgerError::invalid(format!(
            "attribute name '{}' normalizes to an empty key",
            new_name
        ))
        .into());
    }

    let conflict = attribute_definition::Entity::find()
        .filter(
            Condition::any()
                .add(attribute_definition::Column::Name.eq(new_name))
                .add(attribute_definition::Column::Key.eq(&new_key)),
        )
        .filter(attribute_definition::Column::Id.ne(definition_id))
        .one(db)
        .await?;
    if conflict.is_some() {
        return Err(LedgerError::invalid(format!(
            "attribute definition '{}' already exists",
            new_name
        ))
        .into());
    }

    let old_key = definition.key.clone();

    let mut active: attribute_definition::ActiveModel = definition.into();
    active.name = Set(new_name.to_string());
    active.key = Set(new_key.clone());
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    if old_key != new_key {
        let category_ids = linked_category_ids(db, definition_id).await?;
        if scope_has_items(db, &category_ids).await? {
            info!(
                definition_id,
                old_key = %old_key,
                new_key = %new_key,
                "definition renamed, propagating key move"
            );
            trigger_propagation(
                db,
                queue,
                Job::RenameKey {
                    old_key,
                    new_key,
                    category_ids,
                },
            )
            .await?;
        }
    }

    Ok(updated)
}

/// Delete a definition and its category links, then propagate key removal
///
/// The delete commits regardless of how propagation travels; the scoped
/// categories are captured before the links disappear.
pub async fn delete(
    db: &DatabaseConnection,
    queue: &dyn JobQueue,
    definition_id: i64,
) -> anyhow::Result<()> {
    let definition = attribute_definition::Entity::find_by_id(definition_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found("attribute definition", definition_id))?;

    let category_ids = linked_category_ids(db, definition_id).await?;

    let txn = db.begin().await?;
    category_attribute_link::Entity::delete_many()
        .filter(category_attribute_link::Column::AttributeDefinitionId.eq(definition_id))
        .exec(&txn)
        .await?;
    attribute_definition::Entity::delete_by_id(definition_id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    if scope_has_items(db, &category_ids).await? {
        info!(
            definition_id,
            key = %definition.key,
            "definition deleted, propagating key removal"
        );
        trigger_propagation(
            db,
            queue,
            Job::RemoveKey {
                key: definition.key,
                category_ids,
            },
        )
        .await?;
    }

    Ok(())
}

async fn linked_category_ids(
    db: &DatabaseConnection,
    definition_id: i64,
) -> anyhow::Result<Vec<i64>> {
    Ok(category_attribute_link::Entity::find()
        .filter(category_attribute_link::Column::AttributeDefinitionId.eq(definition_id))
        .select_only()
        .column(category_attribute_link::Column::CategoryId)
        .into_tuple::<i64>()
        .all(db)
        .await?)
}
