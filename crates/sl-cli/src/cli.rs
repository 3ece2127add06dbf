//! CLI argument definitions using clap derive API

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sluice - dependency-ordered database migrations
#[derive(Parser, Debug)]
#[command(name = "sluice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the database connection string
    #[arg(short, long, global = true, env = "SLUICE_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create sluice.yml and an empty migrations directory
    Init(InitArgs),

    /// Create a new migration file depending on the latest one
    New(NewArgs),

    /// List migrations in dependency order with their applied status
    History(HistoryArgs),

    /// Apply every pending migration
    Apply(ApplyArgs),

    /// Roll back applied migrations, newest first
    Rollback(RollbackArgs),

    /// Record migrations as applied without running them
    Mark(MarkArgs),

    /// Remove ledger entries without rolling back
    Unmark(MarkArgs),

    /// Delete a migration and repoint its dependents
    Remove(RemoveArgs),

    /// Merge runs of migrations into single files
    Squash(SquashArgs),

    /// Classify every statement and report failures
    Validate(ValidateArgs),

    /// Delete backup files left by squash and remove
    Clean(CleanArgs),

    /// Convert a yoyo-migrations project and copy its applied history
    MigrateYoyo(MigrateYoyoArgs),
}

/// Dialects accepted by `init`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectArg {
    Postgres,
    Duckdb,
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// SQL dialect for the new project
    #[arg(long, value_enum, default_value = "postgres")]
    pub dialect: DialectArg,

    /// Migrations directory, relative to the project directory
    #[arg(long, default_value = "migrations")]
    pub migrations: String,

    /// Overwrite an existing sluice.yml
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Short description, also used for the file name (asked for when omitted)
    pub message: Vec<String>,
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only list migrations that have not been applied
    #[arg(long)]
    pub unapplied: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the rollback command
#[derive(Args, Debug)]
pub struct RollbackArgs {
    /// Number of migrations to roll back (0 means all)
    #[arg(short, long, default_value_t = 1)]
    pub count: usize,

    /// Roll back every applied migration
    #[arg(long, conflicts_with = "count")]
    pub all: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the mark and unmark commands
#[derive(Args, Debug)]
pub struct MarkArgs {
    /// Migration ids or unique prefixes (default: all candidates)
    pub ids: Vec<String>,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the remove command
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Migration id or unique prefix
    pub id: String,

    /// Rename the file to .bak instead of deleting it
    #[arg(long)]
    pub backup: bool,
}

/// Arguments for the squash command
#[derive(Args, Debug)]
pub struct SquashArgs {
    /// Rename squashed files to .bak instead of deleting them
    #[arg(long)]
    pub backup: bool,

    /// Annotate every merged statement with its source migration
    #[arg(long)]
    pub source: bool,

    /// Ask before keeping each UPDATE statement
    #[arg(long)]
    pub update_prompt: bool,

    /// Confirm before skipping unsquashable migrations, offering removal instead
    #[arg(long)]
    pub skip_prompt: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the clean command
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// List the files that would be deleted without deleting them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the migrate-yoyo command
#[derive(Args, Debug)]
pub struct MigrateYoyoArgs {
    /// Leave migration files alone and only copy the applied history
    #[arg(long)]
    pub skip_files: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
