//! FIFO consumption planning
//!
//! The plan is pure arithmetic over a snapshot of open batches, already
//! ordered FIFO by the caller (`received_date` ascending, id ascending).
//! Each draw records the quantity observed in the snapshot so the engine can
//! apply it as a conditional decrement and detect concurrent writers.

use rust_decimal::Decimal;

use lotbook_common::LedgerError;
use lotbook_persistence::entity::batch;

/// One planned decrement against one batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draw {
    pub batch_id: i64,
    /// Batch quantity at planning time, the optimistic-lock witness
    pub observed_quantity: Decimal,
    /// Quantity this draw consumes, 0 < consumed <= observed
    pub consumed: Decimal,
}

/// Plan draining `requested` units from the FIFO-ordered open batches
///
/// Fails with `InsufficientStock` when the batches cannot cover the request;
/// exact exhaustion of the final batch is a normal plan, not an error.
pub fn plan_consumption(
    batches: &[batch::Model],
    requested: Decimal,
) -> Result<Vec<Draw>, LedgerError> {
    let available: Decimal = batches.iter().map(|b| b.quantity).sum();
    if available < requested {
        return Err(LedgerError::InsufficientStock {
            requested,
            available,
        });
    }

    let mut draws = Vec::new();
    let mut remaining = requested;

    for batch in batches {
        if remaining.is_zero() {
            break;
        }
        let consumed = batch.quantity.min(remaining);
        if consumed.is_zero() {
            continue;
        }
        draws.push(Draw {
            batch_id: batch.id,
            observed_quantity: batch.quantity,
            consumed,
        });
        remaining -= consumed;
    }

    Ok(draws)
}
