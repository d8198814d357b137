use sediment::collection::ListOptions;
use sediment::doc;
use sediment::errors::ErrorKind;
use sediment_int_test::test_util::{posts_schema, run_test, users_schema};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_accessor_names_follow_index_flags() {
    run_test(|ctx| {
        let users = ctx.db().model(users_schema())?;
        assert_eq!(
            users.accessors().method_names(),
            vec!["get_by_email", "list_by_city"]
        );

        let posts = ctx.db().model(posts_schema())?;
        assert_eq!(posts.accessors().method_names(), vec!["list_by_author"]);
        Ok(())
    })
}

#[test]
fn test_get_by_unique_property() {
    run_test(|ctx| {
        let users = ctx.db().model(users_schema())?;
        users.insert(&doc! { "email": "alice@example.com", "name": "Alice", "city": "Oslo" })?;

        let alice = users.get_by("email", "alice@example.com")?.unwrap();
        assert_eq!(alice.id(), Some("id-1".to_string()));

        assert_eq!(users.get_by("email", "nobody@example.com")?, None);
        Ok(())
    })
}

#[test]
fn test_get_by_requires_unique_flag() {
    run_test(|ctx| {
        let users = ctx.db().model(users_schema())?;
        let err = users.get_by("city", "Oslo").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IndexNotFound);
        Ok(())
    })
}

#[test]
fn test_list_by_secondary_property() {
    run_test(|ctx| {
        let users = ctx.db().model(users_schema())?;
        users.insert(&doc! { "email": "a@x.y", "city": "Oslo" })?;
        users.insert(&doc! { "email": "b@x.y", "city": "Bergen" })?;
        users.insert(&doc! { "email": "c@x.y", "city": "Oslo" })?;

        let in_oslo = users.list_by("city", "Oslo", &ListOptions::new())?;
        let ids: Vec<_> = in_oslo.iter().filter_map(|d| d.id()).collect();

        // newest first within the bucket
        assert_eq!(ids, vec!["id-3", "id-1"]);
        assert!(users.list_by("city", "Tromsø", &ListOptions::new())?.is_empty());
        Ok(())
    })
}

#[test]
fn test_list_by_reference_groups_under_referenced_document() {
    run_test(|ctx| {
        let db = ctx.db();
        let users = db.model(users_schema())?;
        let posts = db.model(posts_schema())?;

        let alice = users.insert(&doc! { "email": "alice@example.com", "city": "Oslo" })?;
        let bob = users.insert(&doc! { "email": "bob@example.com", "city": "Bergen" })?;
        let alice_id = alice.id().unwrap();
        let bob_id = bob.id().unwrap();

        posts.insert(&doc! { "title": "First", "author": alice_id.clone() })?;
        posts.insert(&doc! { "title": "Second", "author": bob_id.clone() })?;
        posts.insert(&doc! { "title": "Third", "author": alice_id.clone() })?;

        let by_alice = posts.list_by("author", alice_id, &ListOptions::new())?;
        let titles: Vec<_> = by_alice
            .iter()
            .map(|d| d.get("title").unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["Third", "First"]);

        let by_bob = posts.list_by("author", bob_id, &ListOptions::new())?;
        assert_eq!(by_bob.len(), 1);
        Ok(())
    })
}

#[test]
fn test_list_by_requires_list_flag() {
    run_test(|ctx| {
        let users = ctx.db().model(users_schema())?;
        let err = users
            .list_by("email", "a@x.y", &ListOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IndexNotFound);
        Ok(())
    })
}

#[test]
fn test_dangling_unique_entry_reads_as_missing() {
    run_test(|ctx| {
        let db = ctx.db();
        let users = db.model(users_schema())?;
        users.insert(&doc! { "email": "alice@example.com", "city": "Oslo" })?;

        // corrupt the store behind the model's back: drop the primary row
        // but leave the unique entry in place
        db.store().hash_delete("users", "id-1")?;

        assert_eq!(users.get_by("email", "alice@example.com")?, None);
        Ok(())
    })
}
