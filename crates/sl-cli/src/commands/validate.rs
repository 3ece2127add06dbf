//! Validate command implementation

use anyhow::Result;
use sl_migrate::validate;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{
    load_batch, load_project, plural, print_json, print_table, ExitCode,
};

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let classifier = project.classifier()?;
    let batch = load_batch(&project, &classifier)?;

    let report = validate(&batch, &classifier)?;
    if args.json {
        print_json(&report)?;
    } else {
        if !report.issues.is_empty() {
            let rows: Vec<Vec<String>> = report
                .issues
                .iter()
                .map(|i| {
                    vec![
                        i.id.to_string(),
                        i.section.to_string(),
                        i.error.clone(),
                    ]
                })
                .collect();
            print_table(&["ID", "SECTION", "ERROR"], &rows);
            println!();
        }
        for id in &report.skipped {
            println!("Skipped script migration {id}");
        }
        println!(
            "Checked {} in {}: {}",
            plural(report.statements, "statement"),
            plural(report.migrations, "migration"),
            plural(report.issues.len(), "error")
        );
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
