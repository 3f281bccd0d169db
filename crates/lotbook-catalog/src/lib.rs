//! Lotbook Catalog - attribute schema store and item catalog
//!
//! Services over the schema side of the ledger: attribute definitions,
//! category links, categories, items, and per-item attribute documents.
//! Schema mutations trigger propagation jobs through the queue abstraction,
//! with synchronous inline fallback when no broker accepts the job.

pub mod service;
