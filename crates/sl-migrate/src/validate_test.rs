use super::*;
use crate::migration::ScriptRegistry;
use sl_sql::PostgresDialect;
use std::fs;
use tempfile::TempDir;

fn load(files: &[(&str, &str)]) -> (TempDir, Batch) {
    let dir = TempDir::new().unwrap();
    for (name, text) in files {
        fs::write(dir.path().join(name), text).unwrap();
    }
    let batch = Batch::load(dir.path(), &PostgresDialect::new(), &ScriptRegistry::new()).unwrap();
    (dir, batch)
}

#[test]
fn test_clean_batch() {
    let (_dir, batch) = load(&[
        (
            "a.sql",
            "-- a\n-- depends:\n\n-- migrate: apply\nCREATE TABLE one (id INT);\nINSERT INTO one VALUES (1);\n\n-- migrate: rollback\nDROP TABLE one;\n",
        ),
        ("b.rs", "//! b\n//! depends: a\n"),
    ]);
    let report = validate(&batch, &Classifier::default()).unwrap();
    assert!(report.is_ok());
    assert_eq!(report.migrations, 1);
    assert_eq!(report.statements, 3);
    assert_eq!(report.skipped, vec![MigrationId::try_new("b").unwrap()]);
}

#[test]
fn test_every_failure_is_reported() {
    let (_dir, batch) = load(&[
        (
            "a.sql",
            "-- a\n-- depends:\n\n-- migrate: apply\nCREATE TABLE lock (id INT);\nCREATE ROLE admin;\n\n-- migrate: rollback\nDROP TABLE lock;\n",
        ),
        (
            "b.sql",
            "-- b\n-- depends: a\n\n-- migrate: apply\nCREATE TABLE ok (id INT);\n\n-- migrate: rollback\nDROP TABLE ok;\n",
        ),
    ]);
    let report = validate(&batch, &Classifier::default()).unwrap();
    assert!(!report.is_ok());
    assert_eq!(report.statements, 5);

    let found: Vec<(&str, &str)> = report
        .issues
        .iter()
        .map(|i| (i.id.as_str(), i.section))
        .collect();
    assert_eq!(found, vec![("a", "apply"), ("a", "apply"), ("a", "rollback")]);
    assert!(matches!(report.issues[0].source, SqlError::ParseError { .. }));
    assert!(matches!(report.issues[1].source, SqlError::MissingIdentifier { .. }));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["issues"][0]["section"], "apply");
    assert!(json["issues"][0].get("source").is_none());
}
