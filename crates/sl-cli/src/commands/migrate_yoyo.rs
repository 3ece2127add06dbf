//! Migrate-yoyo command implementation

use anyhow::{Context, Result};
use sl_migrate::yoyo::{convert_directory, copy_history};

use crate::cli::{GlobalArgs, MigrateYoyoArgs};
use crate::commands::common::{connect, load_project, plural};

/// Execute the migrate-yoyo command
pub async fn execute(args: &MigrateYoyoArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;

    if args.skip_files {
        log::debug!("--skip-files set, leaving migration files alone");
    } else {
        let dir = project.migrations_dir();
        let report = convert_directory(&dir)
            .with_context(|| format!("Failed to convert migrations in {}", dir.display()))?;
        for path in &report.converted {
            println!("Converted {}", relative(&project.root, path));
        }
        for path in &report.skipped {
            println!("Convert by hand: {}", relative(&project.root, path));
        }
    }

    let db = connect(&project, global)?;
    let copied = copy_history(db.as_ref())
        .await
        .context("Failed to copy yoyo history")?;
    println!("Copied {} from yoyo history", plural(copied, "migration"));
    Ok(())
}

fn relative(root: &std::path::Path, path: &std::path::Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

#[cfg(test)]
#[path = "migrate_yoyo_test.rs"]
mod tests;
