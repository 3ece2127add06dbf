//! Error types for sl-core

use thiserror::Error;

/// Core error type for Sluice
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config {path}: {source}")]
    ConfigParseError {
        path: String,
        source: serde_yaml::Error,
    },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Migrations directory not found
    #[error("[E004] Migrations directory not found: {path}")]
    MigrationsDirNotFound { path: String },

    /// E005: Invalid migration id
    #[error("[E005] Invalid migration id '{id}': {reason}")]
    InvalidMigrationId { id: String, reason: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while reading a migration file into memory.
///
/// Every variant names the file (or migration id) it concerns.
#[derive(Error, Debug)]
pub enum LoadError {
    /// L001: Apply marker missing
    #[error("[L001] {file}: No '-- migrate: apply' found.")]
    MissingApplyMarker { file: String },

    /// L002: Rollback marker missing
    #[error("[L002] {file}: No '-- migrate: rollback' found.")]
    MissingRollbackMarker { file: String },

    /// L003: A section marker appears more than once
    #[error("[L003] {file}: '{marker}' appears {count} times, expected exactly once.")]
    DuplicateMarker {
        file: String,
        marker: String,
        count: usize,
    },

    /// L004: Rollback marker precedes the apply marker
    #[error("[L004] {file}: '-- migrate: rollback' must come after '-- migrate: apply'.")]
    MarkersOutOfOrder { file: String },

    /// L005: Header does not carry a message and depends line
    #[error("[L005] {file}: No '-- depends:' or message found.")]
    InvalidHeader { file: String },

    /// L006: Script header does not carry a depends line
    #[error("[L006] {file}: No '//! depends:' found in script header.")]
    InvalidScriptHeader { file: String },

    /// L007: File could not be read
    #[error("[L007] {file}: could not read migration: {source}")]
    Unreadable {
        file: String,
        source: std::io::Error,
    },

    /// L008: A dependency id does not resolve inside the batch
    #[error("[L008] {file}: could not resolve dependencies: {missing}")]
    UnresolvedDependency { file: String, missing: String },

    /// L009: Two files share one migration id
    #[error("[L009] Duplicate migration id '{id}' ({first} and {second})")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },

    /// L010: Script migration has no registered body
    #[error("[L010] {file}: no script body registered for migration '{id}'")]
    ScriptNotRegistered { file: String, id: String },

    /// L012: A section could not be split into statements
    #[error("[L012] {file}: could not split {section} section: {message}")]
    Unsplittable {
        file: String,
        section: String,
        message: String,
    },

    /// L013: File name does not yield a usable id
    #[error("[L013] {file}: invalid migration id: {reason}")]
    InvalidId { file: String, reason: String },

    /// L014: File extension is not a migration format
    #[error("[L014] {file}: not a migration file (expected .sql or .rs)")]
    UnsupportedFile { file: String },

    /// L011: Several migrations failed to load
    #[error("[L011] {} migrations failed to load:\n{}", .0.len(), format_errors(.0))]
    Multiple(Vec<LoadError>),
}

fn format_errors(errors: &[LoadError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl LoadError {
    /// Collapse a list of load failures into one error.
    ///
    /// Returns `None` when the list is empty.
    pub fn aggregate(mut errors: Vec<LoadError>) -> Option<LoadError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(LoadError::Multiple(errors)),
        }
    }
}

/// Result type alias for LoadError
pub type LoadResult<T> = Result<T, LoadError>;
