use super::*;
use crate::commands::unmark;
use sl_db::ledger;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn project() -> TempDir {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("sluice.yml"),
        format!(
            "dialect: duckdb\ndatabase:\n  path: \"{}\"\n",
            temp.path().join("app.duckdb").display()
        ),
    )
    .unwrap();
    let dir = temp.path().join("migrations");
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
    temp
}

fn global(dir: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: 0,
        project_dir: dir.to_path_buf(),
        config: None,
        database: None,
    }
}

async fn ledger_ids(dir: &Path) -> Vec<String> {
    let db = sl_db::connect(dir.join("app.duckdb").to_str().unwrap()).unwrap();
    let mut ids: Vec<String> = ledger::applied_migrations(db.as_ref())
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_mark_by_prefix_then_unmark() {
    let temp = project();
    let args = MarkArgs {
        ids: vec!["0001".to_string()],
        yes: true,
    };
    execute(&args, &global(temp.path())).await.unwrap();
    assert_eq!(ledger_ids(temp.path()).await, vec!["0001_one"]);

    let all = MarkArgs {
        ids: Vec::new(),
        yes: true,
    };
    execute(&all, &global(temp.path())).await.unwrap();
    assert_eq!(ledger_ids(temp.path()).await, vec!["0001_one", "0002_two"]);

    unmark::execute(&all, &global(temp.path())).await.unwrap();
    assert!(ledger_ids(temp.path()).await.is_empty());
}

#[tokio::test]
async fn test_mark_unknown_id_fails() {
    let temp = project();
    let args = MarkArgs {
        ids: vec!["9999".to_string()],
        yes: true,
    };
    let err = execute(&args, &global(temp.path())).await.unwrap_err();
    assert!(format!("{err:#}").contains("9999"), "{err:#}");
}
