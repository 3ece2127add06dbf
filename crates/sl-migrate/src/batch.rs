//! A batch: every migration discovered in one directory.
//!
//! The batch replaces any ambient id registry. Dependencies are resolved
//! against the batch at load time and the batch is the only input to
//! sorting, so separate batches never share state.

use crate::error::{MigrateError, MigrateResult};
use crate::migration::{Migration, MigrationKind, Runnable, ScriptRegistry};
use sl_core::{stable_topological_sort, LoadError, MigrationGraph, MigrationId};
use sl_db::{ledger, Database};
use sl_sql::SqlDialect;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// All migrations found in one directory, in file name order
#[derive(Debug)]
pub struct Batch {
    dir: PathBuf,
    migrations: Vec<Migration>,
    index: HashMap<MigrationId, usize>,
}

impl Batch {
    /// List migration files in `dir`, sorted by file name.
    ///
    /// Anything that is not `.sql` or `.rs` is skipped, which covers the
    /// `.bak` and `.squash` files left behind by squash.
    pub fn discover(dir: &Path) -> MigrateResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(sl_core::CoreError::MigrationsDirNotFound {
                path: dir.display().to_string(),
            }
            .into());
        }
        let entries = std::fs::read_dir(dir).map_err(|e| MigrateError::io(dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| MigrateError::io(dir, e))?.path();
            let is_migration = path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(MigrationKind::from_extension)
                    .is_some();
            if is_migration {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }

    /// Discover and load every migration in `dir`.
    ///
    /// Every file is attempted; all failures come back together.
    pub fn load(
        dir: &Path,
        dialect: &dyn SqlDialect,
        scripts: &ScriptRegistry,
    ) -> MigrateResult<Self> {
        let mut migrations = Vec::new();
        let mut errors = Vec::new();
        for path in Self::discover(dir)? {
            match Migration::load(&path, dialect, scripts) {
                Ok(m) => migrations.push(m),
                Err(e) => errors.push(e),
            }
        }
        if let Some(err) = LoadError::aggregate(errors) {
            return Err(err.into());
        }
        let batch = Self::from_migrations(dir, migrations)?;
        log::debug!("Loaded {} migrations from {}", batch.len(), dir.display());
        Ok(batch)
    }

    /// Build a batch, checking id uniqueness and that every dependency
    /// resolves inside it.
    pub fn from_migrations(dir: &Path, migrations: Vec<Migration>) -> MigrateResult<Self> {
        let mut index: HashMap<MigrationId, usize> = HashMap::with_capacity(migrations.len());
        let mut errors = Vec::new();
        for (i, m) in migrations.iter().enumerate() {
            if let Some(&first) = index.get(&m.id) {
                errors.push(LoadError::DuplicateId {
                    id: m.id.to_string(),
                    first: migrations[first].path.display().to_string(),
                    second: m.path.display().to_string(),
                });
            } else {
                index.insert(m.id.clone(), i);
            }
        }

        for m in &migrations {
            let missing: Vec<&str> = m
                .dependencies()
                .iter()
                .filter(|d| !index.contains_key(*d))
                .map(MigrationId::as_str)
                .collect();
            if !missing.is_empty() {
                errors.push(LoadError::UnresolvedDependency {
                    file: m.path.display().to_string(),
                    missing: missing.join(", "),
                });
            }
        }

        if let Some(err) = LoadError::aggregate(errors) {
            return Err(err.into());
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            migrations,
            index,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Migrations in file name order
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Migration> {
        self.index.get(id).map(|&i| &self.migrations[i])
    }

    /// Look up by exact id, then by unique id prefix
    pub fn find(&self, id_or_prefix: &str) -> MigrateResult<&Migration> {
        if let Some(m) = self.get(id_or_prefix) {
            return Ok(m);
        }
        let mut matches = self
            .migrations
            .iter()
            .filter(|m| m.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(m), None) => Ok(m),
            _ => Err(MigrateError::MigrationNotFound {
                id: id_or_prefix.to_string(),
            }),
        }
    }

    /// Every migration in dependency order
    pub fn sorted(&self) -> MigrateResult<Vec<&Migration>> {
        let ids: Vec<MigrationId> = self.migrations.iter().map(|m| m.id.clone()).collect();
        self.sort(&ids)
    }

    /// Order a subset of the batch.
    ///
    /// Dependencies on batch members outside `ids` count as satisfied.
    /// Ties keep the order of `ids`.
    pub fn sort(&self, ids: &[MigrationId]) -> MigrateResult<Vec<&Migration>> {
        let mut dependencies: HashMap<MigrationId, Vec<MigrationId>> = HashMap::new();
        for id in ids {
            let m = self.get(id).ok_or_else(|| MigrateError::MigrationNotFound {
                id: id.to_string(),
            })?;
            for dep in m.dependencies() {
                if !self.index.contains_key(dep) {
                    return Err(MigrateError::UnknownDependency {
                        id: id.to_string(),
                        dependency: dep.to_string(),
                    });
                }
            }
            dependencies.insert(id.clone(), m.dependencies().to_vec());
        }

        let order = stable_topological_sort(ids, &dependencies).map_err(|e| {
            MigrateError::CircularDependency {
                migrations: e
                    .unresolved
                    .iter()
                    .map(MigrationId::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })?;
        Ok(order
            .iter()
            .filter_map(|id| self.get(id))
            .collect())
    }

    /// Dependency graph of the whole batch
    pub fn graph(&self) -> MigrationGraph {
        MigrationGraph::build(
            self.migrations
                .iter()
                .map(|m| (&m.id, m.dependencies())),
        )
    }

    /// Last migration in dependency order, the default parent of a new one
    pub fn last_id(&self) -> MigrateResult<Option<MigrationId>> {
        Ok(self.sorted()?.last().map(|m| m.id.clone()))
    }

    /// Set every migration's applied flag from a set of ledger hashes
    pub fn mark_applied(&mut self, hashes: &HashSet<String>) {
        for m in &mut self.migrations {
            m.applied = hashes.contains(&m.hash);
        }
    }

    /// Snapshot applied state from the ledger
    pub async fn refresh_applied(&mut self, db: &dyn Database) -> MigrateResult<()> {
        let hashes = if db.relation_exists(ledger::LEDGER_TABLE).await? {
            ledger::applied_hashes(db).await?
        } else {
            HashSet::new()
        };
        self.mark_applied(&hashes);
        Ok(())
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
