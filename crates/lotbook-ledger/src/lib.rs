//! Lotbook Ledger - the stock ledger engine
//!
//! Owns batches and stock transactions. Purchases create one batch plus one
//! inbound transaction row; usages drain open batches in strict FIFO order
//! (`received_date` ascending, id ascending on ties) and emit one outbound
//! transaction row per batch touched. For any `(item, facility)` the sum of
//! open batch quantities always equals the sum of all transaction rows.

pub mod fifo;
pub mod model;
pub mod service;

pub use model::{PurchaseParams, UsageParams};
