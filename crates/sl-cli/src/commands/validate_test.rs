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

fn project_with(statement: &str) -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("sluice.yml"), "dialect: postgres\n").unwrap();
    let dir = temp.path().join("migrations");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("0001_init.sql"),
        format!("-- init\n-- depends:\n\n-- migrate: apply\n{statement}\n\n-- migrate: rollback\n"),
    )
    .unwrap();
    temp
}

#[tokio::test]
async fn test_validate_clean_batch() {
    let temp = project_with("CREATE TABLE users (id INT);");
    execute(&ValidateArgs { json: false }, &global(temp.path()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_validate_failure_sets_exit_code() {
    let temp = project_with("CREATE TABLE lock (id INT);");
    let err = execute(&ValidateArgs { json: true }, &global(temp.path()))
        .await
        .unwrap_err();
    let code = err.downcast_ref::<ExitCode>().expect("exit code");
    assert_eq!(code.0, 1);
}
