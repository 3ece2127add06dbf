//! New command implementation
//!
//! Only declarative migrations are created here. Script migrations need a
//! body registered by a program linking sl-migrate, which this binary is not.

use anyhow::{Context, Result};
use sl_core::header::declarative_template;
use sl_core::naming::new_migration_id;
use sl_migrate::Prompt;
use std::fs;

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::{load_batch, load_project};
use crate::commands::prompt::confirmer;

/// Execute the new command
pub async fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let dir = project.migrations_dir();
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let classifier = project.classifier()?;
    let batch = load_batch(&project, &classifier)?;
    let depends: Vec<_> = batch.last_id()?.into_iter().collect();
    let heads = batch.graph().heads();
    if heads.len() > 1 {
        let names: Vec<&str> = heads.iter().map(|h| h.as_str()).collect();
        log::warn!(
            "{} migrations have no dependents ({}); the new one depends on the latest only",
            heads.len(),
            names.join(", ")
        );
    }

    let message = message(args)?;
    let existing: Vec<&str> = batch.iter().map(|m| m.id.as_str()).collect();
    let id = new_migration_id(&existing, &message, chrono::Local::now().date_naive());

    let path = dir.join(format!("{id}.sql"));
    fs::write(&path, declarative_template(&message, &depends)).with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Created {id} depending on {depends:?}");
    println!("{}", path.display());
    Ok(())
}

fn message(args: &NewArgs) -> Result<String> {
    if !args.message.is_empty() {
        return Ok(args.message.join(" "));
    }
    let mut prompt = confirmer(false)
        .context("A message is required when stdin is not a terminal")?;
    let message = prompt.input("Migration message", "")?;
    Ok(message.trim().to_string())
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
