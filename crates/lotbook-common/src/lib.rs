//! Lotbook Common - shared error taxonomy and attribute-key utilities
//!
//! This crate provides:
//! - `LedgerError`: the domain error enum shared by every Lotbook crate
//! - Attribute-key normalization and validation helpers

pub mod error;
pub mod key;

pub use error::LedgerError;
pub use key::{is_valid_key, normalize_key};
