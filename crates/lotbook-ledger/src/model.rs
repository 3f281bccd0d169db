//! Ledger operation parameters

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Parameters for recording a purchase (lot intake)
#[derive(Clone, Debug)]
pub struct PurchaseParams {
    pub item_id: i64,
    pub facility_id: i64,
    /// Strictly positive quantity received
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub received_date: DateTime<Utc>,
    /// Supplying vendor, when known
    pub source_id: Option<i64>,
    pub lot_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub performed_by: Option<i64>,
    pub notes: Option<String>,
}

/// Parameters for recording a usage (FIFO consumption)
#[derive(Clone, Debug)]
pub struct UsageParams {
    pub item_id: i64,
    pub facility_id: i64,
    /// Strictly negative quantity; the magnitude is consumed
    pub quantity: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub performed_by: Option<i64>,
    pub notes: Option<String>,
}
