//! Remove command implementation

use anyhow::Result;
use sl_migrate::remove;

use crate::cli::{GlobalArgs, RemoveArgs};
use crate::commands::common::{load_batch, load_project};

/// Execute the remove command
pub async fn execute(args: &RemoveArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let classifier = project.classifier()?;
    let batch = load_batch(&project, &classifier)?;

    let report = remove(&batch, &args.id, args.backup)?;
    println!("Removed {}", report.removed);
    for id in &report.rewritten {
        println!("  Updated depends of {id}");
    }
    Ok(())
}
