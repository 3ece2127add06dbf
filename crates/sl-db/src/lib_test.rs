use super::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_connect_in_memory() {
    let db = connect("duckdb://:memory:").unwrap();
    assert_eq!(db.db_type(), "duckdb");
    db.execute("CREATE TABLE t (id INT)").await.unwrap();
    assert!(db.relation_exists("t").await.unwrap());
}

#[test]
fn test_connect_rejects_other_schemes() {
    let dir = TempDir::new().unwrap();
    let url = format!("postgres://user@localhost/{}", dir.path().display());
    let err = match connect(&url) {
        Err(err) => err,
        Ok(_) => panic!("postgres url should be rejected"),
    };
    assert!(matches!(err, DbError::ConnectionError(_)));
    assert!(err.to_string().contains("postgres://"), "{err}");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_connect_rejects_empty_target() {
    assert!(matches!(
        connect("duckdb://"),
        Err(DbError::ConnectionError(_))
    ));
}
