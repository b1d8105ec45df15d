//! Member store behaviour against a real SQLite file
mod utils;

use starter_packs_lib::modules::members::MemberRepository;
use starter_packs_lib::shared::Database;
use utils::factories::{pack_uri, MemberEntryFactory};
use utils::test_db::TestDb;

#[tokio::test]
async fn upsert_is_keyed_by_member_and_pack() {
    let db = TestDb::new();
    let repo = db.repository();
    let pack_a = pack_uri("did:plc:alice", "abc123");
    let pack_b = pack_uri("did:plc:bob", "def456");

    let entries = vec![
        MemberEntryFactory::new("did:plc:m1").pack(&pack_a, "A", "alice.test").build(),
        MemberEntryFactory::new("did:plc:m1").pack(&pack_b, "B", "bob.test").build(),
        MemberEntryFactory::new("did:plc:m2").pack(&pack_a, "A", "alice.test").build(),
    ];
    assert_eq!(repo.upsert_members(&entries).await.unwrap(), 3);
    assert_eq!(repo.upsert_members(&entries).await.unwrap(), 3);

    let a = repo.aggregate_pack(&pack_a).await.unwrap().unwrap();
    let b = repo.aggregate_pack(&pack_b).await.unwrap().unwrap();
    assert_eq!(a.user_count, 2);
    assert_eq!(b.user_count, 1);
}

#[tokio::test]
async fn aggregate_reflects_latest_write() {
    let db = TestDb::new();
    let repo = db.repository();
    let pack = pack_uri("did:plc:alice", "abc123");

    repo.upsert_members(&[MemberEntryFactory::new("did:plc:m1")
        .handle("old.test")
        .pack(&pack, "Old name", "alice.test")
        .build()])
        .await
        .unwrap();
    repo.upsert_members(&[MemberEntryFactory::new("did:plc:m1")
        .handle("new.test")
        .display_name("Renamed")
        .pack(&pack, "New name", "alice.test")
        .build()])
        .await
        .unwrap();

    let summary = repo.aggregate_pack(&pack).await.unwrap().unwrap();
    assert_eq!(summary.name, "New name");
    assert_eq!(summary.user_count, 1);
    assert_eq!(summary.users[0].handle, "new.test");
    assert_eq!(summary.users[0].display_name, "Renamed");
}

#[tokio::test]
async fn users_keep_first_insertion_order() {
    let db = TestDb::new();
    let repo = db.repository();
    let pack = pack_uri("did:plc:alice", "abc123");

    for did in ["did:plc:zed", "did:plc:amy", "did:plc:kim"] {
        repo.upsert_members(&[MemberEntryFactory::new(did).pack(&pack, "P", "alice.test").build()])
            .await
            .unwrap();
    }
    // Updating an existing member keeps its position
    repo.upsert_members(&[MemberEntryFactory::new("did:plc:zed").pack(&pack, "P", "alice.test").build()])
        .await
        .unwrap();

    let dids: Vec<_> = repo
        .aggregate_pack(&pack)
        .await
        .unwrap()
        .unwrap()
        .users
        .into_iter()
        .map(|u| u.did)
        .collect();
    assert_eq!(dids, vec!["did:plc:zed", "did:plc:amy", "did:plc:kim"]);
}

#[tokio::test]
async fn find_by_handle_lists_every_pack() {
    let db = TestDb::new();
    let repo = db.repository();

    for (rkey, creator) in [("p1", "alice.test"), ("p2", "bob.test")] {
        let pack = pack_uri("did:plc:creator", rkey);
        repo.upsert_members(&[MemberEntryFactory::new("did:plc:m1")
            .handle("member.test")
            .pack(&pack, rkey, creator)
            .build()])
            .await
            .unwrap();
    }

    let found = repo.find_by_handle("member.test").await.unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[1].pack_creator_handle, "bob.test");
    assert!(repo.find_by_handle("nobody.test").await.unwrap().is_empty());
}

#[tokio::test]
async fn store_survives_reopen() {
    let db = TestDb::new();
    let path = db.path("members.db").to_string_lossy().to_string();
    let pack = pack_uri("did:plc:alice", "abc123");

    db.repository()
        .upsert_members(&[MemberEntryFactory::new("did:plc:m1").pack(&pack, "P", "alice.test").build()])
        .await
        .unwrap();

    let reopened = Database::connect(&path, 1).unwrap();
    assert_eq!(reopened.run_migrations().unwrap(), 0);
    let repo = starter_packs_lib::modules::members::SqliteMemberRepository::new(std::sync::Arc::new(reopened));
    assert_eq!(repo.list_pack_ids().await.unwrap(), vec![pack]);
}
