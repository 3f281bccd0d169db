//! Catalog service layer
//!
//! Free async functions over `&DatabaseConnection`; schema mutations take a
//! `&dyn JobQueue` as well and trigger propagation through it.

pub mod category;
pub mod definition;
pub mod document;
pub mod item;
pub mod link;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::{debug, error};

use lotbook_common::LedgerError;
use lotbook_persistence::entity::item as item_entity;
use lotbook_queue::{Job, JobQueue};
use lotbook_worker::propagation;

/// Hand a propagation job to the broker, or run it inline when refused
///
/// The definitional change is already committed when this runs; the caller's
/// success never waits on an accepted enqueue. Inline execution failure is
/// surfaced as `PropagationFailure` so the schema edit is loudly retryable.
pub(crate) async fn trigger_propagation(
    db: &DatabaseConnection,
    queue: &dyn JobQueue,
    job: Job,
) -> anyhow::Result<()> {
    if queue.enqueue(job.clone()).await {
        debug!(job = job.name(), "propagation job enqueued");
        return Ok(());
    }

    propagation::execute(db, &job).await.map_err(|err| {
        error!(
            job = job.name(),
            detail = %job.describe(),
            error = %err,
            "inline propagation failed"
        );
        LedgerError::PropagationFailure(format!("{}: {}", job.describe(), err))
    })?;

    Ok(())
}

/// True when at least one item lives in any of the given categories
///
/// Trigger sites skip propagation entirely for empty scopes; there is
/// nothing to rewrite.
pub(crate) async fn scope_has_items(
    db: &DatabaseConnection,
    category_ids: &[i64],
) -> anyhow::Result<bool> {
    if category_ids.is_empty() {
        return Ok(false);
    }

    let count = item_entity::Entity::find()
        .filter(item_entity::Column::CategoryId.is_in(category_ids.to_vec()))
        .count(db)
        .await?;

    Ok(count > 0)
}
