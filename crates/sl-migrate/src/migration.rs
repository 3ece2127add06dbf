//! The migration entity and its runnable bodies.

use async_trait::async_trait;
use sl_core::header::{parse_declarative, parse_script_header};
use sl_core::{LoadError, LoadResult, MigrationHeader, MigrationId};
use sl_db::{Database, DbError, DbResult};
use sl_sql::splitter::ensure_terminated;
use sl_sql::{split_statements, SqlDialect};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source form of a migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationKind {
    /// `.sql` file with apply and rollback sections
    Sql,
    /// `.rs` file whose body is registered by the host program
    Script,
}

impl MigrationKind {
    /// Kind for a file extension, `None` for files that are not migrations
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "sql" => Some(MigrationKind::Sql),
            "rs" => Some(MigrationKind::Script),
            _ => None,
        }
    }
}

impl fmt::Display for MigrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationKind::Sql => write!(f, "sql"),
            MigrationKind::Script => write!(f, "script"),
        }
    }
}

/// Something the runner can apply and roll back
#[async_trait]
pub trait Runnable: Send + Sync {
    /// Ids that must be applied first
    fn dependencies(&self) -> &[MigrationId];

    /// False when statements run outside a wrapping transaction
    fn uses_transaction(&self) -> bool;

    async fn apply(&self, db: &dyn Database) -> DbResult<()>;

    async fn rollback(&self, db: &dyn Database) -> DbResult<()>;
}

/// Apply/rollback pair for a script migration, supplied by the host program
#[async_trait]
pub trait ScriptBody: Send + Sync {
    async fn apply(&self, db: &dyn Database) -> DbResult<()>;

    async fn rollback(&self, db: &dyn Database) -> DbResult<()>;
}

/// Script bodies keyed by migration id
#[derive(Default, Clone)]
pub struct ScriptRegistry {
    bodies: HashMap<String, Arc<dyn ScriptBody>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the body for `id`, replacing any earlier one
    pub fn register(&mut self, id: impl Into<String>, body: impl ScriptBody + 'static) {
        self.bodies.insert(id.into(), Arc::new(body));
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ScriptBody>> {
        self.bodies.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.bodies.keys().collect();
        ids.sort();
        f.debug_struct("ScriptRegistry").field("ids", &ids).finish()
    }
}

/// Statements of a declarative migration, split and terminated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlMigration {
    pub apply: Vec<String>,
    pub rollback: Vec<String>,
}

impl SqlMigration {
    async fn run(db: &dyn Database, statements: &[String]) -> DbResult<()> {
        for statement in statements {
            log::debug!("Executing: {statement}");
            db.execute_batch(statement).await?;
        }
        Ok(())
    }
}

enum Body {
    Sql(SqlMigration),
    Script(Option<Arc<dyn ScriptBody>>),
}

/// One migration of a batch
pub struct Migration {
    pub id: MigrationId,
    pub path: PathBuf,
    pub kind: MigrationKind,
    /// Ledger key, the digest of `id`
    pub hash: String,
    /// Snapshot of the ledger taken when the batch was read
    pub applied: bool,
    header: MigrationHeader,
    body: Body,
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("applied", &self.applied)
            .field("header", &self.header)
            .finish()
    }
}

impl Migration {
    /// Read and parse the file at `path`.
    ///
    /// Script migrations pick up their body from `scripts`; a missing body
    /// is only an error once the migration is run.
    pub fn load(path: &Path, dialect: &dyn SqlDialect, scripts: &ScriptRegistry) -> LoadResult<Self> {
        let file = path.display().to_string();
        let kind = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MigrationKind::from_extension)
            .ok_or_else(|| LoadError::UnsupportedFile { file: file.clone() })?;
        let id = MigrationId::from_path(path).map_err(|e| LoadError::InvalidId {
            file: file.clone(),
            reason: e.to_string(),
        })?;
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
            file: file.clone(),
            source,
        })?;

        let (header, body) = match kind {
            MigrationKind::Sql => {
                let (header, sql) = parse_sql(&file, &text, dialect)?;
                (header, Body::Sql(sql))
            }
            MigrationKind::Script => {
                let header = parse_script_header(&file, &text)?;
                (header, Body::Script(scripts.get(id.as_str())))
            }
        };

        Ok(Self {
            hash: id.hash(),
            id,
            path: path.to_path_buf(),
            kind,
            applied: false,
            header,
            body,
        })
    }

    /// Re-read the backing file, keeping the applied snapshot
    pub fn reload(&mut self, dialect: &dyn SqlDialect, scripts: &ScriptRegistry) -> LoadResult<()> {
        let applied = self.applied;
        *self = Self::load(&self.path, dialect, scripts)?;
        self.applied = applied;
        Ok(())
    }

    pub fn message(&self) -> &str {
        &self.header.message
    }

    pub fn header(&self) -> &MigrationHeader {
        &self.header
    }

    pub fn is_sql(&self) -> bool {
        self.kind == MigrationKind::Sql
    }

    /// Split statements, for declarative migrations
    pub fn sql(&self) -> Option<&SqlMigration> {
        match &self.body {
            Body::Sql(sql) => Some(sql),
            Body::Script(_) => None,
        }
    }

    /// Fail when this migration cannot be run in this process
    pub fn ensure_runnable(&self) -> LoadResult<()> {
        match &self.body {
            Body::Script(None) => Err(LoadError::ScriptNotRegistered {
                file: self.path.display().to_string(),
                id: self.id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn missing_body(&self) -> DbError {
        DbError::Script(format!("no script body registered for '{}'", self.id))
    }
}

#[async_trait]
impl Runnable for Migration {
    fn dependencies(&self) -> &[MigrationId] {
        &self.header.depends
    }

    fn uses_transaction(&self) -> bool {
        self.header.use_transaction
    }

    async fn apply(&self, db: &dyn Database) -> DbResult<()> {
        match &self.body {
            Body::Sql(sql) => SqlMigration::run(db, &sql.apply).await,
            Body::Script(Some(body)) => body.apply(db).await,
            Body::Script(None) => Err(self.missing_body()),
        }
    }

    async fn rollback(&self, db: &dyn Database) -> DbResult<()> {
        match &self.body {
            Body::Sql(sql) => SqlMigration::run(db, &sql.rollback).await,
            Body::Script(Some(body)) => body.rollback(db).await,
            Body::Script(None) => Err(self.missing_body()),
        }
    }
}

/// Parse a declarative file's text into header and split statements
pub fn parse_sql(
    file: &str,
    text: &str,
    dialect: &dyn SqlDialect,
) -> LoadResult<(MigrationHeader, SqlMigration)> {
    let source = parse_declarative(file, text)?;
    let split = |section: &str, body: &str| {
        let mut statements =
            split_statements(dialect, body).map_err(|e| LoadError::Unsplittable {
                file: file.to_string(),
                section: section.to_string(),
                message: e.to_string(),
            })?;
        ensure_terminated(&mut statements);
        Ok::<_, LoadError>(statements)
    };
    let sql = SqlMigration {
        apply: split("apply", &source.apply)?,
        rollback: split("rollback", &source.rollback)?,
    };
    Ok((source.header, sql))
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
