//! Mark command implementation

use anyhow::{Context, Result};
use sl_core::MigrationId;
use sl_migrate::{mark, Batch};

use crate::cli::{GlobalArgs, MarkArgs};
use crate::commands::common::{connect, load_batch, load_project, plural};
use crate::commands::prompt::confirmer;

/// Execute the mark command
pub async fn execute(args: &MarkArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let classifier = project.classifier()?;
    let mut batch = load_batch(&project, &classifier)?;
    let ids = resolve_ids(&batch, &args.ids)?;
    let mut prompt = confirmer(args.yes)
        .context("Confirmation needed but stdin is not a terminal (pass --yes)")?;
    let db = connect(&project, global)?;

    let marked = mark(&mut batch, db.as_ref(), &ids, prompt.as_mut()).await?;
    println!("Marked {} as applied", plural(marked.len(), "migration"));
    Ok(())
}

/// Expand ids or unique prefixes to full ids
pub(crate) fn resolve_ids(batch: &Batch, args: &[String]) -> Result<Vec<MigrationId>> {
    args.iter()
        .map(|arg| Ok(batch.find(arg)?.id.clone()))
        .collect()
}

#[cfg(test)]
#[path = "mark_test.rs"]
mod tests;
