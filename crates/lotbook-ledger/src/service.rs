//! Ledger engine service layer
//!
//! Purchases and usages commit batches and transaction rows atomically.
//! Usage consumption uses an optimistic discipline: each batch decrement is
//! a conditional update guarded by the quantity observed at planning time,
//! and a mismatched guard rolls the whole usage back and re-plans from a
//! fresh snapshot, bounded by `MAX_CONSUMPTION_ATTEMPTS`. No other
//! component writes `batch.quantity`.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, warn};

use lotbook_common::LedgerError;
use lotbook_persistence::entity::stock_transaction::TransactionType;
use lotbook_persistence::entity::{batch, facility, item, stock_transaction, vendor};

use crate::fifo::{self, Draw};
use crate::model::{PurchaseParams, UsageParams};

/// Re-plans before a concurrent writer surfaces as a conflict to the caller
const MAX_CONSUMPTION_ATTEMPTS: u32 = 3;

/// Record a lot intake: one new batch plus one PURCHASE transaction row,
/// committed atomically
///
/// Returns a single-element list for API symmetry with usage.
pub async fn record_purchase(
    db: &DatabaseConnection,
    params: PurchaseParams,
) -> anyhow::Result<Vec<stock_transaction::Model>> {
    if params.quantity <= Decimal::ZERO {
        return Err(LedgerError::invalid(format!(
            "purchase quantity must be positive, got {}",
            params.quantity
        ))
        .into());
    }

    ensure_item_exists(db, params.item_id).await?;
    ensure_facility_exists(db, params.facility_id).await?;
    if let Some(source_id) = params.source_id {
        ensure_vendor_exists(db, source_id).await?;
    }

    let now = Utc::now();
    let txn = db.begin().await?;

    let created_batch = batch::ActiveModel {
        item_id: Set(params.item_id),
        facility_id: Set(params.facility_id),
        quantity: Set(params.quantity),
        unit_cost: Set(params.unit_cost),
        received_date: Set(params.received_date),
        source_id: Set(params.source_id),
        lot_number: Set(params.lot_number),
        expiration_date: Set(params.expiration_date),
        notes: Set(params.notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let row = stock_transaction::ActiveModel {
        item_id: Set(params.item_id),
        facility_id: Set(params.facility_id),
        transaction_type: Set(TransactionType::Purchase),
        quantity_change: Set(params.quantity),
        transaction_date: Set(params.received_date),
        performed_by: Set(params.performed_by),
        source_batch_id: Set(created_batch.id),
        unit_cost: Set(params.unit_cost),
        notes: Set(params.notes),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        item_id = params.item_id,
        facility_id = params.facility_id,
        batch_id = created_batch.id,
        quantity = %params.quantity,
        "purchase recorded"
    );

    Ok(vec![row])
}

/// Record a usage: drain open batches FIFO and emit one USAGE transaction
/// row per batch touched, all in one atomic unit
///
/// The input encodes the request as a negative quantity; zero is rejected
/// as invalid, not treated as a no-op.
pub async fn record_usage(
    db: &DatabaseConnection,
    params: UsageParams,
) -> anyhow::Result<Vec<stock_transaction::Model>> {
    if params.quantity >= Decimal::ZERO {
        return Err(LedgerError::invalid(format!(
            "usage quantity must be negative, got {}",
            params.quantity
        ))
        .into());
    }

    ensure_item_exists(db, params.item_id).await?;
    ensure_facility_exists(db, params.facility_id).await?;

    let requested = -params.quantity;

    for attempt in 1..=MAX_CONSUMPTION_ATTEMPTS {
        let batches = open_batches_fifo(db, params.item_id, params.facility_id).await?;
        let draws = fifo::plan_consumption(&batches, requested)?;

        match apply_usage(db, &params, &draws).await? {
            Some(rows) => {
                info!(
                    item_id = params.item_id,
                    facility_id = params.facility_id,
                    requested = %requested,
                    batches_touched = rows.len(),
                    attempt,
                    "usage recorded"
                );
                return Ok(rows);
            }
            None => {
                warn!(
                    item_id = params.item_id,
                    facility_id = params.facility_id,
                    attempt,
                    "batch snapshot went stale during consumption, re-planning"
                );
            }
        }
    }

    Err(LedgerError::ConcurrencyConflict(format!(
        "could not drain {} of item {} at facility {} after {} attempts",
        requested, params.item_id, params.facility_id, MAX_CONSUMPTION_ATTEMPTS
    ))
    .into())
}

/// Sum of open batch quantities for the item at the facility
pub async fn stock_on_hand(
    db: &DatabaseConnection,
    item_id: i64,
    facility_id: i64,
) -> anyhow::Result<Decimal> {
    let batches = open_batches_fifo(db, item_id, facility_id).await?;
    Ok(batches.iter().map(|b| b.quantity).sum())
}

/// Ledger readback for the item/facility pair, ordered by row id
pub async fn find_transactions(
    db: &DatabaseConnection,
    item_id: i64,
    facility_id: i64,
) -> anyhow::Result<Vec<stock_transaction::Model>> {
    Ok(stock_transaction::Entity::find()
        .filter(stock_transaction::Column::ItemId.eq(item_id))
        .filter(stock_transaction::Column::FacilityId.eq(facility_id))
        .order_by_asc(stock_transaction::Column::Id)
        .all(db)
        .await?)
}

/// Audit hook: batch-quantity sum must equal the all-time transaction sum
pub async fn verify_conservation(
    db: &DatabaseConnection,
    item_id: i64,
    facility_id: i64,
) -> anyhow::Result<bool> {
    let batch_sum: Decimal = batch::Entity::find()
        .filter(batch::Column::ItemId.eq(item_id))
        .filter(batch::Column::FacilityId.eq(facility_id))
        .all(db)
        .await?
        .iter()
        .map(|b| b.quantity)
        .sum();

    let transaction_sum: Decimal = find_transactions(db, item_id, facility_id)
        .await?
        .iter()
        .map(|t| t.quantity_change)
        .sum();

    Ok(batch_sum == transaction_sum)
}

/// Open batches in strict FIFO order: received date ascending, id ascending
/// on ties (the tie-break is explicit, not a storage-layer default)
async fn open_batches_fifo(
    db: &DatabaseConnection,
    item_id: i64,
    facility_id: i64,
) -> anyhow::Result<Vec<batch::Model>> {
    Ok(batch::Entity::find()
        .filter(batch::Column::ItemId.eq(item_id))
        .filter(batch::Column::FacilityId.eq(facility_id))
        .filter(batch::Column::Quantity.gt(Decimal::ZERO))
        .order_by_asc(batch::Column::ReceivedDate)
        .order_by_asc(batch::Column::Id)
        .all(db)
        .await?)
}

/// Apply the planned draws and insert the usage rows in one transaction
///
/// Returns None when any conditional decrement misses its observed-quantity
/// guard; everything is rolled back and the caller re-plans.
async fn apply_usage(
    db: &DatabaseConnection,
    params: &UsageParams,
    draws: &[Draw],
) -> anyhow::Result<Option<Vec<stock_transaction::Model>>> {
    let now = Utc::now();
    let txn = db.begin().await?;

    for draw in draws {
        let result = batch::Entity::update_many()
            .col_expr(
                batch::Column::Quantity,
                Expr::value(draw.observed_quantity - draw.consumed),
            )
            .col_expr(batch::Column::UpdatedAt, Expr::value(now))
            .filter(batch::Column::Id.eq(draw.batch_id))
            .filter(batch::Column::Quantity.eq(draw.observed_quantity))
            .exec(&txn)
            .await?;

        if result.rows_affected != 1 {
            txn.rollback().await?;
            return Ok(None);
        }
    }

    let mut rows = Vec::with_capacity(draws.len());
    for draw in draws {
        let row = stock_transaction::ActiveModel {
            item_id: Set(params.item_id),
            facility_id: Set(params.facility_id),
            transaction_type: Set(TransactionType::Usage),
            quantity_change: Set(-draw.consumed),
            transaction_date: Set(params.transaction_date),
            performed_by: Set(params.performed_by),
            source_batch_id: Set(draw.batch_id),
            unit_cost: Set(None),
            notes: Set(params.notes.clone()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        rows.push(row);
    }

    txn.commit().await?;
    Ok(Some(rows))
}

async fn ensure_item_exists(db: &DatabaseConnection, item_id: i64) -> anyhow::Result<()> {
    item::Entity::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found("item", item_id))?;
    Ok(())
}

async fn ensure_facility_exists(db: &DatabaseConnection, facility_id: i64) -> anyhow::Result<()> {
    facility::Entity::find_by_id(facility_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found("facility", facility_id))?;
    Ok(())
}

async fn ensure_vendor_exists(db: &DatabaseConnection, vendor_id: i64) -> anyhow::Result<()> {
    vendor::Entity::find_by_id(vendor_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found("vendor", vendor_id))?;
    Ok(())
}
