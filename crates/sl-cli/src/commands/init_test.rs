use super::*;
use sl_core::Config;
use std::path::Path;
use tempfile::tempdir;

fn global(dir: &Path, database: Option<&str>) -> GlobalArgs {
    GlobalArgs {
        verbose: 0,
        project_dir: dir.to_path_buf(),
        config: None,
        database: database.map(String::from),
    }
}

fn args(force: bool) -> InitArgs {
    InitArgs {
        dialect: DialectArg::Duckdb,
        migrations: "migrations".to_string(),
        force,
    }
}

#[tokio::test]
async fn test_init_writes_loadable_config() {
    let temp = tempdir().unwrap();
    execute(&args(false), &global(temp.path(), Some("app.duckdb")))
        .await
        .unwrap();

    assert!(temp.path().join("migrations").is_dir());
    let config = Config::load_from_dir(temp.path()).unwrap();
    assert_eq!(config.dialect, sl_core::Dialect::DuckDb);
    assert_eq!(config.database.path.as_deref(), Some("app.duckdb"));
}

#[tokio::test]
async fn test_init_defaults_to_env_connection() {
    let temp = tempdir().unwrap();
    execute(&args(false), &global(temp.path(), None)).await.unwrap();
    let config = Config::load_from_dir(temp.path()).unwrap();
    assert_eq!(config.database.env.as_deref(), Some("DATABASE_URL"));
}

#[tokio::test]
async fn test_init_refuses_to_overwrite() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("sluice.yml"), "migrations: keep\n").unwrap();

    let err = execute(&args(false), &global(temp.path(), None))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(
        fs::read_to_string(temp.path().join("sluice.yml")).unwrap(),
        "migrations: keep\n"
    );

    execute(&args(true), &global(temp.path(), None)).await.unwrap();
    let config = Config::load_from_dir(temp.path()).unwrap();
    assert_eq!(config.migrations, "migrations");
}
