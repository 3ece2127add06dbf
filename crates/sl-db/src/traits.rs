//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Connection used by the migration engine
///
/// One connection serves a whole run. Calls are awaited strictly in
/// sequence; implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute one statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute one statement with positional string parameters
    async fn execute_with_params(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return every row, each column rendered as a string
    async fn fetch(&self, sql: &str) -> DbResult<Vec<Vec<String>>>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Open a transaction
    async fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    async fn rollback(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
