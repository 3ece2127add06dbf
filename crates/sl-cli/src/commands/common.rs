//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use sl_core::Config;
use sl_db::Database;
use sl_migrate::{Batch, ScriptRegistry};
use sl_sql::{dialect_from_name, Classifier};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; nothing user-facing to print.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A loaded sluice.yml and the directory it lives in
#[derive(Debug, Clone)]
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

impl Project {
    pub(crate) fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_dir(&self.root)
    }

    /// Classifier for the configured dialect
    pub(crate) fn classifier(&self) -> Result<Classifier> {
        let dialect = dialect_from_name(&self.config.dialect.to_string())
            .context("Failed to select SQL dialect")?;
        Ok(Classifier::new(dialect))
    }
}

/// Load the project named by `--config`, or search upward from the
/// project directory for sluice.yml.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    match &global.config {
        Some(path) => {
            let config = Config::load(path).context("Failed to load config")?;
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            Ok(Project { root, config })
        }
        None => {
            let (root, config) =
                Config::find(&global.project_dir).context("Failed to load project")?;
            Ok(Project { root, config })
        }
    }
}

/// Load every migration in the project's migrations directory.
///
/// Script bodies are not linked into the CLI, so script migrations load
/// with metadata only and fail before any database work if a run needs them.
pub(crate) fn load_batch(project: &Project, classifier: &Classifier) -> Result<Batch> {
    let dir = project.migrations_dir();
    Batch::load(&dir, classifier.dialect(), &ScriptRegistry::new())
        .with_context(|| format!("Failed to load migrations from {}", dir.display()))
}

/// Open the database named by `--database`, the configured env var, or
/// `database.path`, in that order.
pub(crate) fn connect(project: &Project, global: &GlobalArgs) -> Result<Box<dyn Database>> {
    let conn = project
        .config
        .resolve_connection_string(global.database.as_deref())
        .context("Failed to resolve database connection")?;
    sl_db::connect(&conn).context("Failed to connect to database")
}

/// Calculate column widths for table output.
///
/// For each column, returns the maximum width across the header and all
/// row values so that data aligns when printed with left-padding.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

/// `1 migration` / `3 migrations`
pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
