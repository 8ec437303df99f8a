//! `AccessControl` adapter against a real Postgres instance (§4.1).

mod common;

use rag_domain::ports::access::AccessControl;
use rag_domain::value_objects::{ObjectType, Permission, PrincipalType};

#[tokio::test]
async fn first_grant_installs_the_caller_as_owner() {
    let (db, _container) = common::postgres_db().await;

    db.grant(
        "alice",
        "doc-1",
        ObjectType::Document,
        &[("alice", PrincipalType::User)],
        Permission::Read,
        None,
    )
    .await
    .expect("first grant succeeds");

    assert!(db.check("doc-1", "alice", Permission::Owner).await.unwrap());
}

#[tokio::test]
async fn a_principal_without_write_cannot_grant_to_others() {
    let (db, _container) = common::postgres_db().await;

    db.grant(
        "alice",
        "doc-2",
        ObjectType::Document,
        &[("bob", PrincipalType::User)],
        Permission::Read,
        None,
    )
    .await
    .expect("owner install grant");

    let err = db
        .grant(
            "bob",
            "doc-2",
            ObjectType::Document,
            &[("carol", PrincipalType::User)],
            Permission::Read,
            None,
        )
        .await
        .expect_err("read-only principal cannot grant");
    assert!(err.to_string().contains("does not hold write/owner"));
}

#[tokio::test]
async fn objects_for_principal_filters_by_required_level() {
    let (db, _container) = common::postgres_db().await;

    db.grant(
        "alice",
        "doc-3",
        ObjectType::Document,
        &[("alice", PrincipalType::User)],
        Permission::Read,
        None,
    )
    .await
    .unwrap();
    db.grant(
        "alice",
        "doc-4",
        ObjectType::Document,
        &[("alice", PrincipalType::User), ("dave", PrincipalType::User)],
        Permission::Write,
        None,
    )
    .await
    .unwrap();

    let writable = db
        .objects_for_principal("dave", Permission::Write)
        .await
        .unwrap();
    assert_eq!(writable, vec!["doc-4".to_owned()]);

    let owned = db.objects_for_principal("alice", Permission::Owner).await.unwrap();
    assert!(owned.contains(&"doc-3".to_owned()));
    assert!(owned.contains(&"doc-4".to_owned()));
}
