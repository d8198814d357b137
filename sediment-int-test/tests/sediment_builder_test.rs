use sediment::collection::{InitOptions, ListOptions, Property, Schema, ValueKind};
use sediment::common::Defaults;
use sediment::doc;
use sediment::errors::ErrorKind;
use sediment::store::{InMemoryKvStore, KvStore};
use sediment::Sediment;
use sediment_int_test::test_util::{run_test, users_schema, SeqDefaults};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_open_without_store_uses_in_memory_backend() {
    let db = Sediment::builder().open().unwrap();
    assert!(!db.is_closed().unwrap());
    db.close().unwrap();
}

#[test]
fn test_explicit_store() {
    let db = Sediment::builder()
        .store(KvStore::new(InMemoryKvStore::new()))
        .defaults(Defaults::new(SeqDefaults::new()))
        .open()
        .unwrap();

    let users = db.model(users_schema()).unwrap();
    users.insert(&doc! { "email": "a@x.y", "city": "Oslo" }).unwrap();
    assert!(db.store().hash_get("users", "id-1").unwrap().is_some());
    db.close().unwrap();
}

#[test]
fn test_duplicate_store_configuration_fails_at_open() {
    let err = Sediment::builder()
        .store(KvStore::new(InMemoryKvStore::new()))
        .store(KvStore::new(InMemoryKvStore::new()))
        .open()
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
}

#[test]
fn test_init_options_strip_private_fields() {
    let db = Sediment::builder()
        .defaults(Defaults::new(SeqDefaults::new()))
        .init_options(InitOptions { private: false })
        .open()
        .unwrap();

    let accounts = db
        .model(
            Schema::builder("accounts")
                .property(Property::new("email").kind(ValueKind::String).required().unique())
                .property(Property::new("password").private())
                .property(Property::new("created").order())
                .build(),
        )
        .unwrap();

    let saved = accounts
        .insert(&doc! { "email": "a@x.y", "password": "hunter2" })
        .unwrap();
    assert!(!saved.contains("password"));

    let fetched = accounts.get("id-1").unwrap().unwrap();
    assert!(!fetched.contains("password"));
    db.close().unwrap();
}

#[test]
fn test_operations_after_close_fail() {
    run_test(|ctx| {
        let db = ctx.db();
        let users = db.model(users_schema())?;
        users.insert(&doc! { "email": "a@x.y", "city": "Oslo" })?;

        db.close()?;
        assert!(db.is_closed()?);

        let err = users.get("id-1").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
        let err = users.insert(&doc! { "email": "b@x.y", "city": "Oslo" }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
        let err = users.list(&ListOptions::new()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
        Ok(())
    })
}

#[test]
fn test_model_cache_survives_reregistration() {
    run_test(|ctx| {
        let db = ctx.db();
        let first = db.model(users_schema())?;
        first.insert(&doc! { "email": "a@x.y", "city": "Oslo" })?;

        let second = db.model(users_schema())?;
        assert!(second.get_by("email", "a@x.y")?.is_some());
        assert_eq!(db.model_names(), vec!["users".to_string()]);
        Ok(())
    })
}
