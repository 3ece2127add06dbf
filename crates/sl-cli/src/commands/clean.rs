//! Clean command implementation

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::{CleanArgs, GlobalArgs};
use crate::commands::common::{load_project, plural};

/// Extensions of files left behind by squash and remove
const LEFTOVER_EXTENSIONS: [&str; 2] = ["bak", "squash"];

/// Execute the clean command
pub async fn execute(args: &CleanArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let dir = project.migrations_dir();
    if !dir.is_dir() {
        println!("Nothing to clean: {} does not exist", dir.display());
        return Ok(());
    }

    let mut leftovers: Vec<PathBuf> = fs::read_dir(&dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_leftover(path))
        .collect();
    leftovers.sort();

    if args.dry_run {
        println!("Dry run - would remove the following files:");
    }

    let mut removed = 0;
    for path in &leftovers {
        if args.dry_run {
            println!("  Would remove: {}", path.display());
            removed += 1;
            continue;
        }
        match fs::remove_file(path) {
            Ok(()) => {
                println!("  Removed: {}", path.display());
                removed += 1;
            }
            Err(e) => eprintln!("  Failed to remove {}: {}", path.display(), e),
        }
    }

    println!();
    if args.dry_run {
        println!("Would remove {}", plural(removed, "file"));
    } else {
        println!("Removed {}", plural(removed, "file"));
    }
    Ok(())
}

fn is_leftover(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| LEFTOVER_EXTENSIONS.contains(&e))
}

#[cfg(test)]
#[path = "clean_test.rs"]
mod tests;
