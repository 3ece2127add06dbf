use super::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn global(dir: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: 0,
        project_dir: dir.to_path_buf(),
        config: None,
        database: None,
    }
}

fn project() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("sluice.yml"), "dialect: duckdb\n").unwrap();
    let dir = temp.path().join("migrations");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("0001_one.sql"), "keep").unwrap();
    fs::write(dir.join("0001_one.sql.bak"), "old").unwrap();
    fs::write(dir.join("0002_two.sql.squash"), "staged").unwrap();
    temp
}

#[tokio::test]
async fn test_clean_removes_leftovers() {
    let temp = project();
    let dir = temp.path().join("migrations");

    execute(&CleanArgs { dry_run: false }, &global(temp.path()))
        .await
        .unwrap();

    assert!(dir.join("0001_one.sql").exists());
    assert!(!dir.join("0001_one.sql.bak").exists());
    assert!(!dir.join("0002_two.sql.squash").exists());
}

#[tokio::test]
async fn test_clean_dry_run_does_not_remove() {
    let temp = project();
    let dir = temp.path().join("migrations");

    execute(&CleanArgs { dry_run: true }, &global(temp.path()))
        .await
        .unwrap();

    assert!(dir.join("0001_one.sql.bak").exists());
    assert!(dir.join("0002_two.sql.squash").exists());
}

#[tokio::test]
async fn test_clean_without_migrations_dir() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("sluice.yml"), "migrations: nowhere\n").unwrap();
    execute(&CleanArgs { dry_run: false }, &global(temp.path()))
        .await
        .unwrap();
}
