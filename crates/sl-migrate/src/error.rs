//! Error types for sl-migrate

use sl_core::{CoreError, LoadError};
use sl_db::DbError;
use sl_sql::SqlError;
use thiserror::Error;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Migration file could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Project or id error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database error outside a migration body
    #[error(transparent)]
    Db(#[from] DbError),

    /// M001: Dependency cycle
    #[error("[M001] Circular dependencies among these migrations: {migrations}")]
    CircularDependency { migrations: String },

    /// M002: Dependency on a migration that is not part of the batch
    #[error("[M002] Migration '{id}' depends on unknown migration '{dependency}'")]
    UnknownDependency { id: String, dependency: String },

    /// M003: No migration with this id
    #[error("[M003] Migration not found: {id}")]
    MigrationNotFound { id: String },

    /// M004: A migration's apply step failed
    #[error("[M004] Failed to apply {id}: {source}")]
    Apply { id: String, source: DbError },

    /// M005: A migration's rollback step failed
    #[error("[M005] Failed to rollback {id}: {source}")]
    Rollback { id: String, source: DbError },

    /// M006: A statement could not be classified while squashing
    #[error("[M006] {id}: cannot squash statement: {source}\n  {statement}")]
    Classify {
        id: String,
        statement: String,
        source: SqlError,
    },

    /// M007: Squash could not complete
    #[error("[M007] Squash failed: {0}")]
    Squash(String),

    /// M008: IO error with file path context
    #[error("[M008] Failed to access '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// M009: Interactive prompt failed
    #[error("[M009] Prompt failed: {0}")]
    Prompt(std::io::Error),
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

impl MigrateError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        MigrateError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
