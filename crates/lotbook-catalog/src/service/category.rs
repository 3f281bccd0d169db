//! Item category service

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use lotbook_common::LedgerError;
use lotbook_persistence::entity::item_category;

pub async fn create(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
    description: Option<&str>,
) -> anyhow::Result<item_category::Model> {
    if code.trim().is_empty() {
        return Err(LedgerError::invalid("category code must not be empty").into());
    }

    let existing = item_category::Entity::find()
        .filter(item_category::Column::Code.eq(code))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(LedgerError::invalid(format!("category '{}' already exists", code)).into());
    }

    let now = Utc::now();
    let category = item_category::ActiveModel {
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        description: Set(description.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(category)
}

pub async fn get_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> anyhow::Result<Option<item_category::Model>> {
    Ok(item_category::Entity::find()
        .filter(item_category::Column::Code.eq(code))
        .one(db)
        .await?)
}

pub async fn find_all(db: &DatabaseConnection) -> anyhow::Result<Vec<item_category::Model>> {
    Ok(item_category::Entity::find()
        .order_by_asc(item_category::Column::Code)
        .all(db)
        .await?)
}
