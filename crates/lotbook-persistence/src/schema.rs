//! Schema bootstrap from the entity definitions
//!
//! Creates every ledger table on an empty database. Production deployments
//! run managed migrations instead; this path serves embedded databases and
//! the test suites, which bootstrap an in-memory SQLite from the same
//! entities the services query.

use sea_orm::{ConnectionTrait, DatabaseConnection, Schema};

use crate::entity::{
    attribute_definition, attribute_document, batch, category_attribute_link, facility, item,
    item_category, stock_transaction, vendor,
};

/// Create all ledger tables on the connected database
pub async fn create_tables(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = vec![
        schema.create_table_from_entity(item_category::Entity),
        schema.create_table_from_entity(attribute_definition::Entity),
        schema.create_table_from_entity(category_attribute_link::Entity),
        schema.create_table_from_entity(item::Entity),
        schema.create_table_from_entity(attribute_document::Entity),
        schema.create_table_from_entity(facility::Entity),
        schema.create_table_from_entity(vendor::Entity),
        schema.create_table_from_entity(batch::Entity),
        schema.create_table_from_entity(stock_transaction::Entity),
    ];

    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(builder.build(statement)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectOptions, Database, EntityTrait};

    use super::*;

    #[tokio::test]
    async fn test_bootstrap_creates_queryable_tables() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);
        let db = Database::connect(options).await.unwrap();

        create_tables(&db).await.unwrap();
        // second run is a no-op thanks to if_not_exists
        create_tables(&db).await.unwrap();

        assert!(item::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(batch::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(
            stock_transaction::Entity::find()
                .all(&db)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
