//! Apply command implementation

use anyhow::Result;
use sl_migrate::{apply, RunReport};

use crate::cli::{ApplyArgs, GlobalArgs};
use crate::commands::common::{connect, load_batch, load_project, plural, print_json};

/// Execute the apply command
pub async fn execute(args: &ApplyArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let classifier = project.classifier()?;
    let mut batch = load_batch(&project, &classifier)?;
    let db = connect(&project, global)?;

    let report = apply(&mut batch, db.as_ref()).await?;
    if args.json {
        return print_json(&report);
    }
    print_report(&report, "Applied", "Nothing to apply.");
    Ok(())
}

pub(crate) fn print_report(report: &RunReport, verb: &str, noop: &str) {
    if report.is_noop() {
        println!("{noop}");
        return;
    }
    let committed = report.committed();
    for id in &committed {
        println!("  {verb} {id}");
    }
    println!();
    println!("{verb} {}", plural(committed.len(), "migration"));
}

#[cfg(test)]
#[path = "apply_test.rs"]
mod tests;
