//! sl-db - Database layer for Sluice
//!
//! This crate provides the `Database` trait the migration engine talks to,
//! a DuckDB implementation, and the ledger tables that record which
//! migrations have been applied.

pub mod duckdb;
pub mod error;
pub mod ledger;
pub mod traits;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use ledger::LedgerEntry;
pub use traits::Database;

/// Open a connection for a resolved connection string.
///
/// Accepts a DuckDB file path, `:memory:`, or either prefixed with
/// `duckdb://`. Any other `scheme://` is rejected.
pub fn connect(connection: &str) -> DbResult<Box<dyn Database>> {
    let target = match connection.split_once("://") {
        Some(("duckdb", rest)) => rest,
        Some((scheme, _)) => {
            return Err(DbError::ConnectionError(format!(
                "unsupported database scheme '{scheme}://', only DuckDB paths and duckdb:// are supported"
            )))
        }
        None => connection,
    };
    if target.is_empty() {
        return Err(DbError::ConnectionError(
            "empty connection string".to_string(),
        ));
    }
    log::debug!("Opening DuckDB connection to {target}");
    Ok(Box::new(DuckDbBackend::new(target)?))
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
