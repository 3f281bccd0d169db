//! Catalog service tests: schema mutations with inline propagation fallback
//!
//! Every test runs with the disabled queue, so trigger sites execute the
//! propagation functions synchronously and the effects are observable
//! immediately after the call returns.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, QueryFilter, Set};

use lotbook_catalog::service::{category, definition, document, item, link};
use lotbook_catalog::service::item::CreateItemParams;
use lotbook_common::LedgerError;
use lotbook_persistence::entity::{attribute_definition, attribute_document, item as item_entity};
use lotbook_persistence::schema;
use lotbook_persistence::value::{AttributeMap, ScalarValue};
use lotbook_queue::DisabledJobQueue;

async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    schema::create_tables(&db).await.unwrap();
    db
}

fn item_params(code: &str, category_id: i64) -> CreateItemParams {
    CreateItemParams {
        code: code.to_string(),
        name: code.to_string(),
        category_id,
        unit_of_measure: "EA".to_string(),
        notes: None,
    }
}

async fn document_for(db: &DatabaseConnection, item_id: i64) -> Option<AttributeMap> {
    attribute_document::Entity::find()
        .filter(attribute_document::Column::ItemId.eq(item_id))
        .one(db)
        .await
        .unwrap()
        .map(|doc| doc.attributes)
}

#[tokio::test]
async fn test_definition_key_is_derived_from_name() {
    let db = setup().await;

    let def = definition::create(&db, "Flash Point (°C)", Some("°C"), None)
        .await
        .unwrap();
    assert_eq!(def.key, "flash_point_c");

    let err = definition::create(&db, "%%%", None, None).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::InvalidInput(_))
    ));

    let err = definition::create(&db, "Flash Point (°C)", None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_item_creation_prepopulates_document() {
    let db = setup().await;
    let queue = DisabledJobQueue;

    let lub = category::create(&db, "LUB", "Lubricants", None).await.unwrap();
    let viscosity = definition::create(&db, "Viscosity", Some("cSt"), None)
        .await
        .unwrap();
    let grade = definition::create(&db, "Grade", None, None).await.unwrap();
    link::create(&db, &queue, lub.id, viscosity.id).await.unwrap();
    link::create(&db, &queue, lub.id, grade.id).await.unwrap();

    let created = item::create(&db, item_params("LUB-1", lub.id)).await.unwrap();

    let doc = document_for(&db, created.id).await.unwrap();
    assert_eq!(doc, AttributeMap::from_null_keys(["grade", "viscosity"]));
}

#[tokio::test]
async fn test_link_create_propagates_inline() {
    let db = setup().await;
    let queue = DisabledJobQueue;

    let lub = category::create(&db, "LUB", "Lubricants", None).await.unwrap();
    let sol = category::create(&db, "SOL", "Solvents", None).await.unwrap();
    let existing = item::create(&db, item_params("LUB-1", lub.id)).await.unwrap();
    let outsider = item::create(&db, item_params("SOL-1", sol.id)).await.unwrap();

    let ph = definition::create(&db, "pH", None, None).await.unwrap();
    link::create(&db, &queue, lub.id, ph.id).await.unwrap();

    // existing item of the category gained the key synchronously
    let doc = document_for(&db, existing.id).await.unwrap();
    assert!(doc.get("ph").unwrap().is_null());

    // item of another category did not
    let doc = document_for(&db, outsider.id).await.unwrap();
    assert!(!doc.contains_key("ph"));

    // duplicate link is invalid input
    let err = link::create(&db, &queue, lub.id, ph.id).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_link_create_backfills_missing_documents() {
    let db = setup().await;
    let queue = DisabledJobQueue;

    let lub = category::create(&db, "LUB", "Lubricants", None).await.unwrap();

    // an item that predates document backfill, inserted behind the service
    let now = Utc::now();
    let bare = item_entity::ActiveModel {
        code: Set("LUB-OLD".to_string()),
        name: Set("Legacy drum".to_string()),
        category_id: Set(lub.id),
        unit_of_measure: Set("EA".to_string()),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();
    assert!(document_for(&db, bare.id).await.is_none());

    let ph = definition::create(&db, "pH", None, None).await.unwrap();
    link::create(&db, &queue, lub.id, ph.id).await.unwrap();

    assert_eq!(
        document_for(&db, bare.id).await.unwrap(),
        AttributeMap::with_null_key("ph")
    );
}

#[tokio::test]
async fn test_definition_rename_moves_keys() {
    let db = setup().await;
    let queue = DisabledJobQueue;

    let lub = category::create(&db, "LUB", "Lubricants", None).await.unwrap();
    let viscosity = definition::create(&db, "Viscosity", None, None).await.unwrap();
    link::create(&db, &queue, lub.id, viscosity.id).await.unwrap();
    let drum = item::create(&db, item_params("LUB-1", lub.id)).await.unwrap();

    let mut patch = AttributeMap::new();
    patch.insert("viscosity".to_string(), ScalarValue::Float(32.5));
    document::update_attributes(&db, drum.id, &patch).await.unwrap();

    let renamed = definition::rename(&db, &queue, viscosity.id, "Viscosity cSt")
        .await
        .unwrap();
    assert_eq!(renamed.key, "viscosity_cst");

    let doc = document_for(&db, drum.id).await.unwrap();
    assert_eq!(doc.get("viscosity_cst"), Some(&ScalarValue::Float(32.5)));
    assert!(!doc.contains_key("viscosity"));
}

#[tokio::test]
async fn test_definition_delete_removes_keys_and_links() {
    let db = setup().await;
    let queue = DisabledJobQueue;

    let lub = category::create(&db, "LUB", "Lubricants", None).await.unwrap();
    let ph = definition::create(&db, "pH", None, None).await.unwrap();
    let grade = definition::create(&db, "Grade", None, None).await.unwrap();
    link::create(&db, &queue, lub.id, ph.id).await.unwrap();
    link::create(&db, &queue, lub.id, grade.id).await.unwrap();
    let drum = item::create(&db, item_params("LUB-1", lub.id)).await.unwrap();

    definition::delete(&db, &queue, ph.id).await.unwrap();

    assert!(
        attribute_definition::Entity::find_by_id(ph.id)
            .one(&db)
            .await
            .unwrap()
            .is_none()
    );
    let doc = document_for(&db, drum.id).await.unwrap();
    assert!(!doc.contains_key("ph"));
    assert!(doc.contains_key("grade"));
    assert_eq!(
        link::definition_keys_for_category(&db, lub.id).await.unwrap(),
        vec!["grade".to_string()]
    );
}

#[tokio::test]
async fn test_unlink_removes_key_from_that_category_only() {
    let db = setup().await;
    let queue = DisabledJobQueue;

    let lub = category::create(&db, "LUB", "Lubricants", None).await.unwrap();
    let sol = category::create(&db, "SOL", "Solvents", None).await.unwrap();
    let ph = definition::create(&db, "pH", None, None).await.unwrap();
    link::create(&db, &queue, lub.id, ph.id).await.unwrap();
    link::create(&db, &queue, sol.id, ph.id).await.unwrap();
    let drum = item::create(&db, item_params("LUB-1", lub.id)).await.unwrap();
    let can = item::create(&db, item_params("SOL-1", sol.id)).await.unwrap();

    link::delete(&db, &queue, lub.id, ph.id).await.unwrap();

    assert!(!document_for(&db, drum.id).await.unwrap().contains_key("ph"));
    assert!(document_for(&db, can.id).await.unwrap().contains_key("ph"));

    let err = link::delete(&db, &queue, lub.id, ph.id).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_document_edit_validates_against_category_keys() {
    let db = setup().await;
    let queue = DisabledJobQueue;

    let lub = category::create(&db, "LUB", "Lubricants", None).await.unwrap();
    let viscosity = definition::create(&db, "Viscosity", None, None).await.unwrap();
    link::create(&db, &queue, lub.id, viscosity.id).await.unwrap();
    let drum = item::create(&db, item_params("LUB-1", lub.id)).await.unwrap();

    let mut patch = AttributeMap::new();
    patch.insert("density".to_string(), ScalarValue::Float(0.87));
    let err = document::update_attributes(&db, drum.id, &patch).await.unwrap_err();
    let message = format!("{}", err.downcast_ref::<LedgerError>().unwrap());
    assert!(message.contains("density"), "rejection names the key");

    // valid edit merges without clobbering other keys
    let mut patch = AttributeMap::new();
    patch.insert("viscosity".to_string(), ScalarValue::Float(46.0));
    let stored = document::update_attributes(&db, drum.id, &patch).await.unwrap();
    assert_eq!(
        stored.attributes.get("viscosity"),
        Some(&ScalarValue::Float(46.0))
    );

    // a null-valued patch stores null, it does not delete the key
    let mut patch = AttributeMap::new();
    patch.insert("viscosity".to_string(), ScalarValue::Null);
    let stored = document::update_attributes(&db, drum.id, &patch).await.unwrap();
    assert!(stored.attributes.get("viscosity").unwrap().is_null());
    assert!(stored.attributes.contains_key("viscosity"));
}

#[tokio::test]
async fn test_item_requires_existing_category_and_unique_code() {
    let db = setup().await;

    let err = item::create(&db, item_params("X-1", 404)).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::NotFound { entity: "category", .. })
    ));

    let lub = category::create(&db, "LUB", "Lubricants", None).await.unwrap();
    item::create(&db, item_params("LUB-1", lub.id)).await.unwrap();
    let err = item::create(&db, item_params("LUB-1", lub.id)).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::InvalidInput(_))
    ));
}
