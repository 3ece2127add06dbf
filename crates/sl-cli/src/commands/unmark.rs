//! Unmark command implementation

use anyhow::{Context, Result};
use sl_migrate::unmark;

use crate::cli::{GlobalArgs, MarkArgs};
use crate::commands::common::{connect, load_batch, load_project, plural};
use crate::commands::mark::resolve_ids;
use crate::commands::prompt::confirmer;

/// Execute the unmark command
pub async fn execute(args: &MarkArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let classifier = project.classifier()?;
    let mut batch = load_batch(&project, &classifier)?;
    let ids = resolve_ids(&batch, &args.ids)?;
    let mut prompt = confirmer(args.yes)
        .context("Confirmation needed but stdin is not a terminal (pass --yes)")?;
    let db = connect(&project, global)?;

    let unmarked = unmark(&mut batch, db.as_ref(), &ids, prompt.as_mut()).await?;
    println!("Unmarked {}", plural(unmarked.len(), "migration"));
    Ok(())
}
