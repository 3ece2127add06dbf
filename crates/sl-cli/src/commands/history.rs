//! History command implementation

use anyhow::{Context, Result};
use sl_migrate::{history, HistoryEntry};

use crate::cli::{GlobalArgs, HistoryArgs};
use crate::commands::common::{load_batch, load_project, print_json, print_table};

/// Execute the history command
pub async fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let entries = entries(args, global).await?;

    if args.json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No migrations found.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.status().to_string(),
                e.id.to_string(),
                e.kind.to_string(),
                e.message.clone(),
            ]
        })
        .collect();
    print_table(&["STATUS", "ID", "KIND", "MESSAGE"], &rows);
    Ok(())
}

/// History rows in dependency order.
///
/// Without a configured database every migration is listed as unapplied.
async fn entries(args: &HistoryArgs, global: &GlobalArgs) -> Result<Vec<HistoryEntry>> {
    let project = load_project(global)?;
    let classifier = project.classifier()?;
    let mut batch = load_batch(&project, &classifier)?;

    match project
        .config
        .resolve_connection_string(global.database.as_deref())
    {
        Ok(conn) => {
            let db = sl_db::connect(&conn).context("Failed to connect to database")?;
            batch.refresh_applied(db.as_ref()).await?;
        }
        Err(err) => log::warn!("{err}; listing every migration as unapplied"),
    }

    Ok(history(&batch)?
        .into_iter()
        .filter(|e| !(args.unapplied && e.applied))
        .collect())
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
