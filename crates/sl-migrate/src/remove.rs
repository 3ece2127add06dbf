//! Drop one migration from the dependency chain.

use crate::batch::Batch;
use crate::error::{MigrateError, MigrateResult};
use crate::migration::{Migration, Runnable};
use crate::squash::retire;
use sl_core::header::rewrite_depends;
use sl_core::MigrationId;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// What a removal changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveReport {
    pub removed: MigrationId,
    /// Direct dependents whose depends line now points past the removed id
    pub rewritten: Vec<MigrationId>,
}

/// Remove the migration matching `id_or_prefix`.
///
/// Direct dependents inherit the removed migration's own dependencies.
pub fn remove(batch: &Batch, id_or_prefix: &str, backup: bool) -> MigrateResult<RemoveReport> {
    let migration = batch.find(id_or_prefix)?;
    remove_migration(batch, migration, migration.dependencies(), backup)
}

/// Remove `migration`, pointing its dependents at `replacement`
pub(crate) fn remove_migration(
    batch: &Batch,
    migration: &Migration,
    replacement: &[MigrationId],
    backup: bool,
) -> MigrateResult<RemoveReport> {
    log::warn!("Removing {}", migration.id);
    let mut rewritten = Vec::new();
    for dependent_id in batch.graph().dependents(migration.id.as_str()) {
        let Some(dependent) = batch.get(&dependent_id) else {
            continue;
        };
        let path = &dependent.path;
        if !path.exists() {
            continue;
        }
        let text = std::fs::read_to_string(path).map_err(|e| MigrateError::io(path, e))?;
        if let Some(updated) = rewrite_depends(&text, migration.id.as_str(), replacement) {
            std::fs::write(path, updated).map_err(|e| MigrateError::io(path, e))?;
            log::info!("Updated dependencies of {}", dependent.id);
            rewritten.push(dependent.id.clone());
        }
    }
    retire(&migration.path, backup)?;
    Ok(RemoveReport {
        removed: migration.id.clone(),
        rewritten,
    })
}

/// `path` with `suffix` appended to the full file name
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "remove_test.rs"]
mod tests;
