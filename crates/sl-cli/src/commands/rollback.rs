//! Rollback command implementation

use anyhow::Result;
use sl_migrate::rollback;

use crate::cli::{GlobalArgs, RollbackArgs};
use crate::commands::apply::print_report;
use crate::commands::common::{connect, load_batch, load_project, print_json};

/// Execute the rollback command
pub async fn execute(args: &RollbackArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let classifier = project.classifier()?;
    let mut batch = load_batch(&project, &classifier)?;
    let db = connect(&project, global)?;

    let count = if args.all { None } else { Some(args.count) };
    let report = rollback(&mut batch, db.as_ref(), count).await?;
    if args.json {
        return print_json(&report);
    }
    print_report(&report, "Rolled back", "Nothing to roll back.");
    Ok(())
}
