use attrstore::core::{EntityType, OwnerRef};
use attrstore::{AttributeDb, ErrorKind};

fn customer(id: &str) -> OwnerRef {
    OwnerRef::new(EntityType::new("customer"), id)
}

async fn db_with_email_field() -> AttributeDb {
    let db = AttributeDb::new();
    db.registry().register("customer", "email").await.unwrap();
    db
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let db = db_with_email_field().await;
    let owner = customer("c-1");

    let outcome = db
        .attributes()
        .write(&owner, "email", "a@b.com")
        .await
        .unwrap();
    let record = outcome.record().expect("valid write must save");
    assert_eq!(record.value, "a@b.com");
    assert_eq!(record.attributable_type, "customer");
    assert_eq!(record.attributable_id, "c-1");

    let value = db.attributes().read(&owner, "email").await.unwrap();
    assert_eq!(value.as_deref(), Some("a@b.com"));
}

#[tokio::test]
async fn test_read_matches_keys_case_insensitively() {
    let db = db_with_email_field().await;
    let owner = customer("c-1");

    db.attributes()
        .write(&owner, " Email ", "a@b.com")
        .await
        .unwrap();

    let value = db.attributes().read(&owner, "EMAIL").await.unwrap();
    assert_eq!(value.as_deref(), Some("a@b.com"));
}

#[tokio::test]
async fn test_rewrite_updates_in_place() {
    let db = db_with_email_field().await;
    let owner = customer("c-1");

    let first = db
        .attributes()
        .write(&owner, "email", "old@b.com")
        .await
        .unwrap();
    let second = db
        .attributes()
        .write(&owner, "email", "new@b.com")
        .await
        .unwrap();

    // Same row, new value: one record per (owner, key).
    assert_eq!(
        first.record().unwrap().id,
        second.record().unwrap().id
    );
    let records = db.attributes().records_for(&owner).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value, "new@b.com");
}

#[tokio::test]
async fn test_write_without_registered_fields_rejects() {
    let db = AttributeDb::new();
    let owner = customer("c-1");

    let outcome = db
        .attributes()
        .write(&owner, "email", "a@b.com")
        .await
        .unwrap();
    let errors = outcome.errors().expect("must reject");
    assert!(errors.contains("key", ErrorKind::CustomFieldsNotSet));

    // Nothing was persisted.
    assert!(db.attributes().records_for(&owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_write_unregistered_key_rejects_invalid_key() {
    let db = db_with_email_field().await;
    let owner = customer("c-1");

    let outcome = db
        .attributes()
        .write(&owner, "nickname", "Al")
        .await
        .unwrap();
    let errors = outcome.errors().expect("must reject");
    assert!(errors.contains("key", ErrorKind::InvalidKey));
    assert!(!errors.contains("key", ErrorKind::CustomFieldsNotSet));
}

#[tokio::test]
async fn test_blank_key_rejects_regardless_of_registration() {
    let no_fields = AttributeDb::new();
    let with_fields = db_with_email_field().await;
    let owner = customer("c-1");

    for db in [&no_fields, &with_fields] {
        let outcome = db.attributes().write(&owner, "   ", "v").await.unwrap();
        let errors = outcome.errors().expect("blank key must reject");
        assert!(errors.contains("key", ErrorKind::Blank));
    }
}

#[tokio::test]
async fn test_blank_value_rejects() {
    let db = db_with_email_field().await;
    let owner = customer("c-1");

    let outcome = db.attributes().write(&owner, "email", "  ").await.unwrap();
    let errors = outcome.errors().expect("blank value must reject");
    assert!(errors.contains("value", ErrorKind::Blank));
}

#[tokio::test]
async fn test_invalid_write_does_not_clobber_existing_value() {
    let db = db_with_email_field().await;
    let owner = customer("c-1");

    db.attributes()
        .write(&owner, "email", "a@b.com")
        .await
        .unwrap();

    // A blank-value attempt on the same key must leave the record alone.
    let outcome = db.attributes().write(&owner, "email", "").await.unwrap();
    assert!(!outcome.is_saved());

    let value = db.attributes().read(&owner, "email").await.unwrap();
    assert_eq!(value.as_deref(), Some("a@b.com"));
}

#[tokio::test]
async fn test_read_missing_key_is_silent_none() {
    let db = db_with_email_field().await;
    let owner = customer("c-1");

    assert_eq!(db.attributes().read(&owner, "email").await.unwrap(), None);
    // Unregistered and blank keys read as None too, never as an error.
    assert_eq!(db.attributes().read(&owner, "nope").await.unwrap(), None);
    assert_eq!(db.attributes().read(&owner, "").await.unwrap(), None);
}

#[tokio::test]
async fn test_owners_are_isolated() {
    let db = db_with_email_field().await;
    let first = customer("c-1");
    let second = customer("c-2");

    db.attributes()
        .write(&first, "email", "one@b.com")
        .await
        .unwrap();
    db.attributes()
        .write(&second, "email", "two@b.com")
        .await
        .unwrap();

    assert_eq!(
        db.attributes().read(&first, "email").await.unwrap().as_deref(),
        Some("one@b.com")
    );
    assert_eq!(
        db.attributes().read(&second, "email").await.unwrap().as_deref(),
        Some("two@b.com")
    );
}

#[tokio::test]
async fn test_owner_types_are_isolated() {
    let db = db_with_email_field().await;
    db.registry().register("battery", "capacity").await.unwrap();

    // "email" is a customer field, not a battery field.
    let battery = OwnerRef::new(EntityType::new("battery"), "c-1");
    let outcome = db
        .attributes()
        .write(&battery, "email", "a@b.com")
        .await
        .unwrap();
    assert!(outcome.errors().unwrap().contains("key", ErrorKind::InvalidKey));
}

#[tokio::test]
async fn test_destroy_for_removes_all_owner_records() {
    let db = db_with_email_field().await;
    db.registry().register("customer", "phone").await.unwrap();
    let owner = customer("c-1");
    let other = customer("c-2");

    db.attributes()
        .write(&owner, "email", "a@b.com")
        .await
        .unwrap();
    db.attributes().write(&owner, "phone", "555").await.unwrap();
    db.attributes()
        .write(&other, "email", "keep@b.com")
        .await
        .unwrap();

    let removed = db.attributes().destroy_for(&owner).await.unwrap();
    assert_eq!(removed, 2);
    assert!(db.attributes().records_for(&owner).await.unwrap().is_empty());

    // Other owners keep their records.
    assert_eq!(db.attributes().records_for(&other).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_destroy_owner_via_facade() {
    let db = db_with_email_field().await;
    let owner = customer("c-1");

    db.attributes()
        .write(&owner, "email", "a@b.com")
        .await
        .unwrap();

    assert_eq!(db.destroy_owner(&owner).await.unwrap(), 1);
    assert_eq!(db.attributes().read(&owner, "email").await.unwrap(), None);
    // Destroying an owner with no records is a no-op.
    assert_eq!(db.destroy_owner(&owner).await.unwrap(), 0);
}

#[tokio::test]
async fn test_facade_over_caller_supplied_backend() {
    use attrstore::{AttributeDb, InMemoryBackend, RecordBackend};
    use std::sync::Arc;

    let backend: Arc<dyn RecordBackend> = Arc::new(InMemoryBackend::new());
    let db = AttributeDb::with_backend(backend).await.unwrap();

    db.registry().register("customer", "email").await.unwrap();
    let owner = customer("c-1");
    let outcome = db
        .attributes()
        .write(&owner, "email", "a@b.com")
        .await
        .unwrap();
    assert!(outcome.is_saved());
}

#[tokio::test]
async fn test_example_scenario() {
    // register "email" for customer -> write succeeds -> case-insensitive
    // read -> unregistered "phone" rejects.
    let db = AttributeDb::new();
    db.registry().register("customer", "email").await.unwrap();
    let c = customer("C");

    let outcome = db.attributes().write(&c, "email", "a@b.com").await.unwrap();
    assert_eq!(outcome.record().unwrap().value, "a@b.com");

    let value = db.attributes().read(&c, "EMAIL").await.unwrap();
    assert_eq!(value.as_deref(), Some("a@b.com"));

    let outcome = db.attributes().write(&c, "phone", "555").await.unwrap();
    assert!(outcome.errors().unwrap().contains("key", ErrorKind::InvalidKey));
}
