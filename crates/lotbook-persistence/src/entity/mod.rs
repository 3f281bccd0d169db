//! `SeaORM` entities for the stock ledger schema

pub mod prelude;

pub mod attribute_definition;
pub mod attribute_document;
pub mod batch;
pub mod category_attribute_link;
pub mod facility;
pub mod item;
pub mod item_category;
pub mod stock_transaction;
pub mod vendor;
