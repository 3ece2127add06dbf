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

fn args(backup: bool) -> SquashArgs {
    SquashArgs {
        backup,
        source: false,
        update_prompt: false,
        skip_prompt: false,
    }
}

fn write_chain(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
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

#[tokio::test]
async fn test_squash_merges_chain_into_latest() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("sluice.yml"), "dialect: duckdb\n").unwrap();
    let dir = temp.path().join("migrations");
    write_chain(&dir);

    execute(&args(false), &global(temp.path())).await.unwrap();

    assert!(!dir.join("0001_one.sql").exists());
    let merged = fs::read_to_string(dir.join("0002_two.sql")).unwrap();
    assert!(merged.contains("-- squashed: 0001_one"));
    assert!(merged.contains("CREATE TABLE one (id INT);"));
    assert!(merged.contains("CREATE TABLE two (id INT);"));
}

#[tokio::test]
async fn test_squash_backup_from_config() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("sluice.yml"),
        "dialect: duckdb\nsquash:\n  backup: true\n",
    )
    .unwrap();
    let dir = temp.path().join("migrations");
    write_chain(&dir);

    execute(&args(false), &global(temp.path())).await.unwrap();

    assert!(dir.join("0001_one.sql.bak").exists());
    assert!(dir.join("0002_two.sql.bak").exists());
    assert!(dir.join("0002_two.sql").exists());
}

#[tokio::test]
async fn test_squash_single_migration_is_noop() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("sluice.yml"), "dialect: duckdb\n").unwrap();
    let dir = temp.path().join("migrations");
    write_chain(&dir);
    fs::remove_file(dir.join("0002_two.sql")).unwrap();
    let before = fs::read_to_string(dir.join("0001_one.sql")).unwrap();

    execute(&args(false), &global(temp.path())).await.unwrap();
    assert_eq!(fs::read_to_string(dir.join("0001_one.sql")).unwrap(), before);
}

#[test]
fn test_removal_prompt_only_with_skip_prompt() {
    let defaults = SquashConfig::default();
    assert!(!options(&args(false), &defaults).prompt_unsquashable);

    let asked = SquashArgs {
        skip_prompt: true,
        ..args(false)
    };
    let opts = options(&asked, &defaults);
    assert!(opts.prompt_unsquashable);
    assert!(!opts.prompt_updates);
}

#[test]
fn test_config_defaults_apply_without_flags() {
    let defaults = SquashConfig {
        backup: true,
        annotate_source: true,
    };
    let opts = options(&args(false), &defaults);
    assert!(opts.backup);
    assert!(opts.annotate_source);
}
