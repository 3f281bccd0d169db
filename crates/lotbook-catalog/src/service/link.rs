//! Category-attribute link service
//!
//! Linking a definition to a category means every item of the category
//! gains the key; unlinking means every item loses it. Both trigger
//! propagation after the link change itself commits.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::info;

use lotbook_common::LedgerError;
use lotbook_persistence::entity::{attribute_definition, category_attribute_link, item_category};
use lotbook_queue::{Job, JobQueue};

use super::{scope_has_items, trigger_propagation};

pub async fn create(
    db: &DatabaseConnection,
    queue: &dyn JobQueue,
    category_id: i64,
    definition_id: i64,
) -> anyhow::Result<category_attribute_link::Model> {
    let category = item_category::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found("category", category_id))?;
    let definition = attribute_definition::Entity::find_by_id(definition_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found("attribute definition", definition_id))?;

    let existing = category_attribute_link::Entity::find_by_id((category_id, definition_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(LedgerError::invalid(format!(
            "definition '{}' is already linked to category '{}'",
            definition.key, category.code
        ))
        .into());
    }

    let link = category_attribute_link::ActiveModel {
        category_id: Set(category_id),
        attribute_definition_id: Set(definition_id),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    if scope_has_items(db, &[category_id]).await? {
        info!(
            category = %category.code,
            key = %definition.key,
            "category linked to definition, propagating key addition"
        );
        trigger_propagation(
            db,
            queue,
            Job::AddKeyForCategory {
                category_id,
                key: definition.key,
            },
        )
        .await?;
    }

    Ok(link)
}

pub async fn delete(
    db: &DatabaseConnection,
    queue: &dyn JobQueue,
    category_id: i64,
    definition_id: i64,
) -> anyhow::Result<()> {
    let link = category_attribute_link::Entity::find_by_id((category_id, definition_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            LedgerError::not_found(
                "category attribute link",
                format!("{}/{}", category_id, definition_id),
            )
        })?;

    let definition = attribute_definition::Entity::find_by_id(definition_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found("attribute definition", definition_id))?;

    link.delete(db).await?;

    if scope_has_items(db, &[category_id]).await? {
        info!(
            category_id,
            key = %definition.key,
            "category unlinked from definition, propagating key removal"
        );
        trigger_propagation(
            db,
            queue,
            Job::RemoveKey {
                key: definition.key,
                category_ids: vec![category_id],
            },
        )
        .await?;
    }

    Ok(())
}

/// The valid attribute-key set for items of a category, derived from its
/// links; both document validation and propagation scope use this
pub async fn definition_keys_for_category(
    db: &DatabaseConnection,
    category_id: i64,
) -> anyhow::Result<Vec<String>> {
    Ok(attribute_definition::Entity::find()
        .join(
            JoinType::InnerJoin,
            attribute_definition::Relation::CategoryAttributeLink.def(),
        )
        .filter(category_attribute_link::Column::CategoryId.eq(category_id))
        .order_by_asc(attribute_definition::Column::Key)
        .select_only()
        .column(attribute_definition::Column::Key)
        .into_tuple::<String>()
        .all(db)
        .await?)
}
