//! sl-migrate - Migration engine for Sluice
//!
//! Loads a directory of migrations into a [`Batch`], orders it with the
//! stable dependency sort, and applies, rolls back, squashes or removes
//! migrations.

pub mod batch;
pub mod error;
pub mod migration;
pub mod project;
pub mod prompt;
pub mod remove;
pub mod runner;
pub mod squash;
pub mod validate;
pub mod yoyo;

pub use batch::Batch;
pub use error::{MigrateError, MigrateResult};
pub use migration::{
    Migration, MigrationKind, Runnable, ScriptBody, ScriptRegistry, SqlMigration,
};
pub use project::{apply_dir, rollback_dir, Project};
pub use prompt::{AutoPrompt, Prompt, ScriptedPrompt};
pub use remove::{remove, RemoveReport};
pub use runner::{
    apply, history, mark, rollback, unmark, Direction, HistoryEntry, MigrationOutcome,
    MigrationState, RunReport, RunStatus,
};
pub use squash::{
    squash_batch, squash_run, Replacement, SquashAccumulator, SquashOptions, SquashOutcome,
    SquashReport,
};
pub use validate::{validate, ValidationIssue, ValidationReport};
pub use yoyo::YoyoReport;
