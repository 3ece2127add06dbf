//! sl-core - Core library for Sluice
//!
//! This crate provides the pieces every other Sluice crate builds on:
//! migration identifiers, the stable dependency sorter, the dependency
//! graph view, the migration file grammar and project configuration.

pub mod config;
pub mod dag;
pub mod digest;
pub mod error;
pub mod header;
pub mod migration_id;
pub mod naming;
pub mod topo;

pub use config::{Config, DatabaseConfig, Dialect, SquashConfig};
pub use dag::MigrationGraph;
pub use digest::migration_hash;
pub use error::{CoreError, CoreResult, LoadError, LoadResult};
pub use header::{DeclarativeSource, MigrationHeader};
pub use migration_id::MigrationId;
pub use topo::{stable_topological_sort, CycleError};
