//! Init command implementation

use anyhow::{bail, Context, Result};
use sl_core::config::CONFIG_FILE_NAMES;
use std::fs;

use crate::cli::{DialectArg, GlobalArgs, InitArgs};

/// Execute the init command
pub async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let root = &global.project_dir;
    let config_path = root.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create {}", root.display()))?;
    fs::write(&config_path, render_config(args, global.database.as_deref()))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created {}", config_path.display());

    let migrations = root.join(&args.migrations);
    if !migrations.exists() {
        fs::create_dir_all(&migrations)
            .with_context(|| format!("Failed to create {}", migrations.display()))?;
        println!("Created {}", migrations.display());
    }
    Ok(())
}

fn render_config(args: &InitArgs, database: Option<&str>) -> String {
    let dialect = match args.dialect {
        DialectArg::Postgres => "postgres",
        DialectArg::Duckdb => "duckdb",
    };
    let database = match database {
        Some(conn) => format!("database:\n  path: \"{conn}\"\n"),
        None => "database:\n  env: DATABASE_URL\n".to_string(),
    };
    format!(
        "migrations: {}\ndialect: {dialect}\n{database}squash:\n  backup: false\n  annotate_source: false\n",
        args.migrations
    )
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
