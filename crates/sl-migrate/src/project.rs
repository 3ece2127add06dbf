//! Directory and project level entry points.
//!
//! For programs and test suites that embed the engine: point it at a
//! migrations directory, or at a project with a `sluice.yml`, and it loads
//! the batch, opens the configured database when none is given, and runs.

use crate::batch::Batch;
use crate::error::MigrateResult;
use crate::migration::ScriptRegistry;
use crate::runner::{self, RunReport};
use sl_core::{Config, CoreError};
use sl_db::Database;
use sl_sql::{dialect_from_name, SqlDialect};
use std::path::{Path, PathBuf};

/// Load the migrations in `dir` and apply every pending one
pub async fn apply_dir(
    dir: &Path,
    dialect: &dyn SqlDialect,
    scripts: &ScriptRegistry,
    db: &dyn Database,
) -> MigrateResult<RunReport> {
    let mut batch = Batch::load(dir, dialect, scripts)?;
    runner::apply(&mut batch, db).await
}

/// Load the migrations in `dir` and roll back `count` of them, all for `None`
pub async fn rollback_dir(
    dir: &Path,
    dialect: &dyn SqlDialect,
    scripts: &ScriptRegistry,
    db: &dyn Database,
    count: Option<usize>,
) -> MigrateResult<RunReport> {
    let mut batch = Batch::load(dir, dialect, scripts)?;
    runner::rollback(&mut batch, db, count).await
}

/// A `sluice.yml` and the directory it was found in
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Search `start` and its ancestors for sluice.yml
    pub fn find(start: &Path) -> MigrateResult<Self> {
        let (root, config) = Config::find(start)?;
        Ok(Self { root, config })
    }

    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_dir(&self.root)
    }

    pub fn dialect(&self) -> MigrateResult<Box<dyn SqlDialect>> {
        dialect_from_name(&self.config.dialect.to_string()).map_err(|e| {
            CoreError::ConfigInvalid {
                message: e.to_string(),
            }
            .into()
        })
    }

    pub fn load_batch(&self, scripts: &ScriptRegistry) -> MigrateResult<Batch> {
        let dialect = self.dialect()?;
        Batch::load(&self.migrations_dir(), dialect.as_ref(), scripts)
    }

    /// Open the configured database; `explicit` wins over sluice.yml
    pub fn connect(&self, explicit: Option<&str>) -> MigrateResult<Box<dyn Database>> {
        let conn = self.config.resolve_connection_string(explicit)?;
        Ok(sl_db::connect(&conn)?)
    }

    /// Apply every pending migration, on `db` or the configured database
    pub async fn apply(
        &self,
        scripts: &ScriptRegistry,
        db: Option<&dyn Database>,
    ) -> MigrateResult<RunReport> {
        let mut batch = self.load_batch(scripts)?;
        let owned;
        let db = match db {
            Some(db) => db,
            None => {
                owned = self.connect(None)?;
                owned.as_ref()
            }
        };
        runner::apply(&mut batch, db).await
    }

    /// Roll back every applied migration, on `db` or the configured database
    pub async fn rollback(
        &self,
        scripts: &ScriptRegistry,
        db: Option<&dyn Database>,
    ) -> MigrateResult<RunReport> {
        let mut batch = self.load_batch(scripts)?;
        let owned;
        let db = match db {
            Some(db) => db,
            None => {
                owned = self.connect(None)?;
                owned.as_ref()
            }
        };
        runner::rollback(&mut batch, db, None).await
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
