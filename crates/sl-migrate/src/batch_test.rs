use super::*;
use sl_db::DuckDbBackend;
use sl_sql::PostgresDialect;
use std::fs;
use tempfile::TempDir;

fn sql(message: &str, depends: &str) -> String {
    format!("-- {message}\n-- depends: {depends}\n\n-- migrate: apply\nSELECT 1;\n\n-- migrate: rollback\nSELECT 1;\n")
}

fn project(files: &[(&str, String)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, text) in files {
        fs::write(dir.path().join(name), text).unwrap();
    }
    dir
}

fn load(dir: &TempDir) -> MigrateResult<Batch> {
    Batch::load(dir.path(), &PostgresDialect::new(), &ScriptRegistry::new())
}

fn ids(order: &[&Migration]) -> Vec<String> {
    order.iter().map(|m| m.id.to_string()).collect()
}

#[test]
fn test_discover_filters_and_sorts() {
    let dir = project(&[
        ("b.sql", sql("b", "")),
        ("a.sql", sql("a", "")),
        ("c.rs", "//! c\n//! depends:\n".to_string()),
        ("a.sql.bak", sql("old", "")),
        ("b.sql.squash", sql("tmp", "")),
        ("README.md", "docs".to_string()),
    ]);
    let names: Vec<String> = Batch::discover(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.sql", "b.sql", "c.rs"]);
}

#[test]
fn test_discover_missing_dir() {
    let dir = TempDir::new().unwrap();
    let err = Batch::discover(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Core(sl_core::CoreError::MigrationsDirNotFound { .. })
    ));
}

#[test]
fn test_sorted_follows_dependencies() {
    let dir = project(&[
        ("a.sql", sql("a", "c")),
        ("b.sql", sql("b", "")),
        ("c.sql", sql("c", "b")),
    ]);
    let batch = load(&dir).unwrap();
    assert_eq!(ids(&batch.sorted().unwrap()), vec!["b", "c", "a"]);
    assert_eq!(batch.last_id().unwrap().unwrap(), "a");
}

#[test]
fn test_cycle_is_reported_with_every_member() {
    let dir = project(&[
        ("a.sql", sql("a", "b")),
        ("b.sql", sql("b", "a")),
        ("c.sql", sql("c", "")),
    ]);
    let err = load(&dir).unwrap().sorted().unwrap_err();
    match err {
        MigrateError::CircularDependency { migrations } => assert_eq!(migrations, "a, b"),
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn test_subset_sort_ignores_outside_dependencies() {
    let dir = project(&[
        ("a.sql", sql("a", "")),
        ("b.sql", sql("b", "a")),
        ("c.sql", sql("c", "b")),
    ]);
    let batch = load(&dir).unwrap();
    let subset = vec![
        MigrationId::try_new("c").unwrap(),
        MigrationId::try_new("b").unwrap(),
    ];
    assert_eq!(ids(&batch.sort(&subset).unwrap()), vec!["b", "c"]);

    let only_c = vec![MigrationId::try_new("c").unwrap()];
    assert_eq!(ids(&batch.sort(&only_c).unwrap()), vec!["c"]);
}

#[test]
fn test_subset_sort_unknown_id() {
    let dir = project(&[("a.sql", sql("a", ""))]);
    let batch = load(&dir).unwrap();
    let err = batch
        .sort(&[MigrationId::try_new("zzz").unwrap()])
        .unwrap_err();
    assert!(matches!(err, MigrateError::MigrationNotFound { .. }));
}

#[test]
fn test_unresolved_dependency_names_file() {
    let dir = project(&[("a.sql", sql("a", "ghost"))]);
    let err = load(&dir).unwrap_err();
    let msg = err.to_string();
    assert!(
        matches!(err, MigrateError::Load(LoadError::UnresolvedDependency { .. })),
        "{msg}"
    );
    assert!(msg.contains("a.sql"), "{msg}");
    assert!(msg.contains("could not resolve dependencies: ghost"), "{msg}");
}

#[test]
fn test_load_errors_are_collected() {
    let dir = project(&[
        ("a.sql", "-- a\n-- depends:\n-- migrate: apply\n".to_string()),
        ("b.sql", "no header at all".to_string()),
        ("c.sql", sql("c", "")),
    ]);
    match load(&dir).unwrap_err() {
        MigrateError::Load(LoadError::Multiple(errors)) => {
            assert_eq!(errors.len(), 2);
            assert!(matches!(errors[0], LoadError::MissingRollbackMarker { .. }));
            assert!(matches!(errors[1], LoadError::MissingApplyMarker { .. }));
        }
        other => panic!("expected aggregated error, got {other:?}"),
    }
}

#[test]
fn test_duplicate_id_across_formats() {
    let dir = project(&[
        ("a.sql", sql("a", "")),
        ("a.rs", "//! a\n//! depends:\n".to_string()),
    ]);
    let err = load(&dir).unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Load(LoadError::DuplicateId { .. })
    ));
}

#[test]
fn test_find_by_prefix() {
    let dir = project(&[
        ("20240101_01_aaaaa-init.sql", sql("init", "")),
        ("20240102_01_bbbbb-users.sql", sql("users", "20240101_01_aaaaa-init")),
    ]);
    let batch = load(&dir).unwrap();
    assert_eq!(batch.find("20240102").unwrap().id, "20240102_01_bbbbb-users");
    assert!(batch.find("2024").is_err());
    assert!(batch.find("nothing").is_err());
}

#[test]
fn test_graph_dependents() {
    let dir = project(&[
        ("a.sql", sql("a", "")),
        ("b.sql", sql("b", "a")),
        ("c.sql", sql("c", "a")),
    ]);
    let graph = load(&dir).unwrap().graph();
    let dependents: Vec<String> = graph.dependents("a").iter().map(|id| id.to_string()).collect();
    assert_eq!(dependents, vec!["b", "c"]);
}

#[tokio::test]
async fn test_refresh_applied_without_ledger() {
    let dir = project(&[("a.sql", sql("a", ""))]);
    let mut batch = load(&dir).unwrap();
    let db = DuckDbBackend::in_memory().unwrap();
    batch.refresh_applied(&db).await.unwrap();
    assert!(batch.iter().all(|m| !m.applied));
}

#[tokio::test]
async fn test_refresh_applied_from_ledger() {
    let dir = project(&[("a.sql", sql("a", "")), ("b.sql", sql("b", "a"))]);
    let mut batch = load(&dir).unwrap();
    let db = DuckDbBackend::in_memory().unwrap();
    ledger::ensure_tracking_store(&db).await.unwrap();
    let a = batch.get("a").unwrap();
    ledger::record_applied(&db, &a.hash, a.id.as_str()).await.unwrap();

    batch.refresh_applied(&db).await.unwrap();
    assert!(batch.get("a").unwrap().applied);
    assert!(!batch.get("b").unwrap().applied);
}
