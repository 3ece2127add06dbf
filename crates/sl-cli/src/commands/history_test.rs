use super::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write_migrations(root: &Path) {
    let dir = root.join("migrations");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("0001_one.sql"),
        "-- one\n-- depends:\n\n-- migrate: apply\nCREATE TABLE one (id INT);\n\n-- migrate: rollback\nDROP TABLE one;\n",
    )
    .unwrap();
    fs::write(
        dir.join("0002_two.sql"),
        "-- two\n-- depends: 0001_one\n\n-- migrate: apply\nCREATE TABLE two (id INT);\n\n-- migrate: rollback\nDROP TABLE two;\n",
    )
    .unwrap();
}

fn global(dir: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: 0,
        project_dir: dir.to_path_buf(),
        config: None,
        database: None,
    }
}

fn args(unapplied: bool) -> HistoryArgs {
    HistoryArgs {
        unapplied,
        json: false,
    }
}

fn ids(entries: &[HistoryEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
}

#[tokio::test]
async fn test_history_without_database_lists_everything_unapplied() {
    let temp: TempDir = tempdir().unwrap();
    fs::write(temp.path().join("sluice.yml"), "dialect: duckdb\n").unwrap();
    write_migrations(temp.path());

    let entries = entries(&args(false), &global(temp.path())).await.unwrap();
    assert_eq!(ids(&entries), vec!["0001_one", "0002_two"]);
    assert!(entries.iter().all(|e| e.status() == "U"));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 2);

    execute(&args(false), &global(temp.path())).await.unwrap();
}

#[tokio::test]
async fn test_history_reads_ledger_when_database_configured() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("app.duckdb");
    fs::write(
        temp.path().join("sluice.yml"),
        format!("dialect: duckdb\ndatabase:\n  path: \"{}\"\n", db_path.display()),
    )
    .unwrap();
    write_migrations(temp.path());
    {
        let db = sl_db::connect(db_path.to_str().unwrap()).unwrap();
        sl_db::ledger::ensure_tracking_store(db.as_ref()).await.unwrap();
        let hash = sl_core::MigrationId::try_new("0001_one").unwrap().hash();
        sl_db::ledger::record_applied(db.as_ref(), &hash, "0001_one")
            .await
            .unwrap();
    }

    let all = entries(&args(false), &global(temp.path())).await.unwrap();
    let status: Vec<&str> = all.iter().map(|e| e.status()).collect();
    assert_eq!(status, vec!["A", "U"]);

    let pending = entries(&args(true), &global(temp.path())).await.unwrap();
    assert_eq!(ids(&pending), vec!["0002_two"]);
}
