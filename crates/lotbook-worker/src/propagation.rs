//! Idempotent attribute-document rewrites
//!
//! Each operation runs inside a single database transaction and pages
//! through the affected documents, applying the same patch to every page, so
//! propagation latency stays bounded by page count rather than per-document
//! round trips. Re-running any operation after a partial failure converges
//! to the same end state; that idempotence is what makes at-least-once job
//! delivery safe.
//!
//! The worker is the source of truth while a propagation is in flight:
//! writes here are not validated against the category key set.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::info;

use lotbook_persistence::entity::{attribute_document, item};
use lotbook_persistence::value::{AttributeMap, ScalarValue};
use lotbook_queue::Job;

/// Documents rewritten per page within the propagation transaction
const PAGE_SIZE: u64 = 500;

/// Re-patches of a single document before its churn fails the job
const DOCUMENT_WRITE_ATTEMPTS: u32 = 3;

/// Run a job's propagation logic; returns the number of documents rewritten
///
/// Shared by the worker runtime and by trigger sites executing the fallback
/// inline, so both paths run the exact same code.
pub async fn execute(db: &DatabaseConnection, job: &Job) -> anyhow::Result<u64> {
    match job {
        Job::AddKeyForCategory { category_id, key } => {
            add_key_for_category(db, *category_id, key).await
        }
        Job::RenameKey {
            old_key,
            new_key,
            category_ids,
        } => rename_key(db, old_key, new_key, category_ids).await,
        Job::RemoveKey { key, category_ids } => remove_key(db, key, category_ids).await,
    }
}

/// Add `key` (null-valued) to the document of every item in the category
///
/// Items without a document get a fresh one containing only the new key;
/// documents that already carry the key are skipped, so a re-run after a
/// partial failure only touches what the first run missed.
pub async fn add_key_for_category(
    db: &DatabaseConnection,
    category_id: i64,
    key: &str,
) -> anyhow::Result<u64> {
    let txn = db.begin().await?;
    let now = Utc::now();
    let mut rewritten = 0u64;
    let mut cursor = 0i64;

    loop {
        let items = item::Entity::find()
            .filter(item::Column::CategoryId.eq(category_id))
            .filter(item::Column::Id.gt(cursor))
            .order_by_asc(item::Column::Id)
            .limit(PAGE_SIZE)
            .all(&txn)
            .await?;

        let Some(last) = items.last() else {
            break;
        };
        cursor = last.id;

        let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        let mut documents: HashMap<i64, attribute_document::Model> =
            attribute_document::Entity::find()
                .filter(attribute_document::Column::ItemId.is_in(item_ids))
                .all(&txn)
                .await?
                .into_iter()
                .map(|doc| (doc.item_id, doc))
                .collect();

        for item in &items {
            match documents.remove(&item.id) {
                None => {
                    attribute_document::ActiveModel {
                        item_id: Set(item.id),
                        attributes: Set(AttributeMap::with_null_key(key)),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?;
                    rewritten += 1;
                }
                Some(document) => {
                    let patch = |attributes: &mut AttributeMap| {
                        if attributes.contains_key(key) {
                            return false;
                        }
                        attributes.insert(key.to_string(), ScalarValue::Null);
                        true
                    };
                    if patch_document(&txn, document, &patch).await? {
                        rewritten += 1;
                    }
                }
            }
        }
    }

    txn.commit().await?;
    info!(category_id, key, rewritten, "add-key propagation complete");
    Ok(rewritten)
}

/// Move the value under `old_key` to `new_key` across the scoped categories
///
/// Documents without `old_key` are untouched, so a second pass after a
/// completed first pass finds nothing left to move.
pub async fn rename_key(
    db: &DatabaseConnection,
    old_key: &str,
    new_key: &str,
    category_ids: &[i64],
) -> anyhow::Result<u64> {
    let rewritten = patch_scoped_documents(db, category_ids, |attributes| {
        attributes.rename(old_key, new_key)
    })
    .await?;
    info!(old_key, new_key, rewritten, "rename-key propagation complete");
    Ok(rewritten)
}

/// Drop `key` from every document of the scoped categories
pub async fn remove_key(
    db: &DatabaseConnection,
    key: &str,
    category_ids: &[i64],
) -> anyhow::Result<u64> {
    let rewritten = patch_scoped_documents(db, category_ids, |attributes| {
        attributes.remove(key).is_some()
    })
    .await?;
    info!(key, rewritten, "remove-key propagation complete");
    Ok(rewritten)
}

/// Page through the documents of items in the given categories and apply
/// `patch` to each; documents the patch reports untouched are not written
async fn patch_scoped_documents<F>(
    db: &DatabaseConnection,
    category_ids: &[i64],
    patch: F,
) -> anyhow::Result<u64>
where
    F: Fn(&mut AttributeMap) -> bool,
{
    if category_ids.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;
    let mut rewritten = 0u64;
    let mut cursor = 0i64;

    loop {
        let documents = attribute_document::Entity::find()
            .join(JoinType::InnerJoin, attribute_document::Relation::Item.def())
            .filter(item::Column::CategoryId.is_in(category_ids.to_vec()))
            .filter(attribute_document::Column::Id.gt(cursor))
            .order_by_asc(attribute_document::Column::Id)
            .limit(PAGE_SIZE)
            .all(&txn)
            .await?;

        let Some(last) = documents.last() else {
            break;
        };
        cursor = last.id;

        for document in documents {
            if patch_document(&txn, document, &patch).await? {
                rewritten += 1;
            }
        }
    }

    txn.commit().await?;
    Ok(rewritten)
}

/// Apply `patch` to one document through a guarded read-modify-write
///
/// The store only lands when the row still carries the `updated_at` the
/// patch was computed from; a concurrent user edit misses the guard, the
/// document is re-fetched, and the patch re-applied. Returns whether the
/// document was written. A document that keeps churning past the attempt
/// bound fails the job, which is safe to re-run.
async fn patch_document<F>(
    txn: &DatabaseTransaction,
    document: attribute_document::Model,
    patch: &F,
) -> anyhow::Result<bool>
where
    F: Fn(&mut AttributeMap) -> bool,
{
    let mut current = document;

    for attempt in 1..=DOCUMENT_WRITE_ATTEMPTS {
        let mut attributes = current.attributes.clone();
        if !patch(&mut attributes) {
            return Ok(false);
        }

        let result = attribute_document::Entity::update_many()
            .col_expr(attribute_document::Column::Attributes, Expr::value(attributes))
            .col_expr(attribute_document::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(attribute_document::Column::Id.eq(current.id))
            .filter(attribute_document::Column::UpdatedAt.eq(current.updated_at))
            .exec(txn)
            .await?;
        if result.rows_affected == 1 {
            return Ok(true);
        }

        if attempt < DOCUMENT_WRITE_ATTEMPTS {
            match attribute_document::Entity::find_by_id(current.id).one(txn).await? {
                Some(fresh) => current = fresh,
                // row gone in between; nothing left to patch
                None => return Ok(false),
            }
        }
    }

    anyhow::bail!(
        "attribute document {} kept changing during propagation",
        current.id
    )
}
