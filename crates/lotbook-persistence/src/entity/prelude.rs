//! Entity prelude re-exports

pub use super::attribute_definition::Entity as AttributeDefinition;
pub use super::attribute_document::Entity as AttributeDocument;
pub use super::batch::Entity as Batch;
pub use super::category_attribute_link::Entity as CategoryAttributeLink;
pub use super::facility::Entity as Facility;
pub use super::item::Entity as Item;
pub use super::item_category::Entity as ItemCategory;
pub use super::stock_transaction::Entity as StockTransaction;
pub use super::vendor::Entity as Vendor;
