//! Lotbook Persistence - database entities and persistence layer
//!
//! This crate provides:
//! - SeaORM entity definitions for the stock ledger schema
//! - The typed attribute-document value model (`AttributeMap`, `ScalarValue`)
//! - Schema bootstrap for embedded/test databases

pub mod entity;
pub mod schema;
pub mod value;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

// Re-export the attribute value model
pub use value::{AttributeMap, ScalarValue};
