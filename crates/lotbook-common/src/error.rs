//! Error types for the stock ledger and propagation pipeline
//!
//! Every failure a caller can observe maps to one `LedgerError` variant.
//! Services return `anyhow::Result` and attach a variant with `.into()`;
//! transport mapping (HTTP status codes etc.) is an external concern.

use rust_decimal::Decimal;

/// Domain error taxonomy for the ledger and propagation subsystem
#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    /// Malformed or out-of-range input, rejected before any write
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced entity does not exist, rejected before any write
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Requested usage exceeds total open stock for the item/facility
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
    },

    /// A concurrent writer invalidated the in-flight consumption and the
    /// bounded internal retry was exhausted
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// A bulk document update could not complete; the job is idempotent and
    /// safe to re-run
    #[error("propagation failure: {0}")]
    PropagationFailure(String),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        LedgerError::InvalidInput(message.into())
    }
}
