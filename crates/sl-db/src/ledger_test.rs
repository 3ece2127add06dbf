use super::*;
use crate::DuckDbBackend;

async fn db() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    ensure_tracking_store(&db).await.unwrap();
    db
}

#[tokio::test]
async fn test_ensure_tracking_store_creates_tables() {
    let db = db().await;
    assert!(db.relation_exists(LEDGER_TABLE).await.unwrap());
    assert!(db.relation_exists(VERSION_TABLE).await.unwrap());
    assert_eq!(schema_version(&db).await.unwrap(), Some(LEDGER_VERSION));
}

#[tokio::test]
async fn test_ensure_tracking_store_is_idempotent() {
    let db = db().await;
    ensure_tracking_store(&db).await.unwrap();
    let rows = db
        .fetch(&format!("SELECT COUNT(*) FROM {VERSION_TABLE}"))
        .await
        .unwrap();
    assert_eq!(rows[0][0], "1");
}

#[tokio::test]
async fn test_schema_version_before_store_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(schema_version(&db).await.unwrap(), None);
}

#[tokio::test]
async fn test_record_and_list_applied() {
    let db = db().await;
    record_applied(&db, "h1", "20240101_01_aaaaa-one").await.unwrap();
    record_applied(&db, "h2", "20240101_02_bbbbb-two").await.unwrap();

    let entries = applied_migrations(&db).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].hash, "h1");
    assert_eq!(entries[0].id, "20240101_01_aaaaa-one");
    assert!(entries[0].applied_at.is_some());

    let hashes = applied_hashes(&db).await.unwrap();
    assert!(hashes.contains("h1") && hashes.contains("h2"));
}

#[tokio::test]
async fn test_record_applied_twice_keeps_one_row() {
    let db = db().await;
    record_applied(&db, "h1", "one").await.unwrap();
    record_applied(&db, "h1", "one").await.unwrap();
    assert_eq!(applied_migrations(&db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_record_unapplied() {
    let db = db().await;
    record_applied(&db, "h1", "one").await.unwrap();
    record_unapplied(&db, "h1").await.unwrap();
    record_unapplied(&db, "missing").await.unwrap();
    assert!(applied_hashes(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ledger_write_rolls_back_with_transaction() {
    let db = db().await;
    db.begin().await.unwrap();
    record_applied(&db, "h1", "one").await.unwrap();
    db.rollback().await.unwrap();
    assert!(applied_hashes(&db).await.unwrap().is_empty());
}
