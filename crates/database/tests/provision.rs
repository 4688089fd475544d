//! Runs against a live MySQL server configured through the usual `DB_*`
//! variables. Ignored by default: `cargo test -p database -- --ignored`.

use database::{provision, ItemChanges, ItemStore, MySqlItemRepository};

#[tokio::test]
#[ignore = "requires a reachable MySQL server"]
async fn provisioning_twice_keeps_existing_rows() {
    let settings = configuration::load_settings().expect("DB_* variables must be set");

    let pool = provision(&settings.database).await.expect("first provisioning");
    let repo = MySqlItemRepository::new(pool);
    let changes = ItemChanges::normalize(Some("survivor"), Some("kept".into())).unwrap();
    let created = repo.insert(&changes).await.unwrap();
    repo.pool().close().await;

    let pool = provision(&settings.database).await.expect("second provisioning");
    let repo = MySqlItemRepository::new(pool);
    let fetched = repo.get_by_id(created.id).await.unwrap().expect("row survives");
    assert_eq!(fetched.name, "survivor");
    assert_eq!(fetched.description, "kept");
    assert_eq!(fetched.created_at, fetched.updated_at);

    let updated = repo
        .update(created.id, &ItemChanges::normalize(Some("survivor"), None).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(updated.updated_at > fetched.updated_at);
    assert_eq!(updated.created_at, fetched.created_at);
    assert_eq!(updated.description, "");

    assert_eq!(repo.delete(created.id).await.unwrap(), 1);
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
}
