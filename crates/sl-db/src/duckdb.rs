//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn execute_sync(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, duckdb::params_from_iter(params.iter()))
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    fn fetch_sync(&self, sql: &str) -> DbResult<Vec<Vec<String>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        // Column metadata is only reliable after execution, so read the
        // count from each row.
        let rows = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count)
                    .map(|i| get_column_as_string(row, i))
                    .collect::<Vec<_>>())
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn transaction_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::TransactionError(format!("{sql} failed: {e}")))
    }

    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
                duckdb::params![schema, table],
                |row| row.get(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count > 0)
    }
}

/// Read a column value as a String, trying multiple DuckDB types.
///
/// DuckDB integer columns return `None` for `Option<String>`, so we try
/// String -> i64 -> f64 -> bool -> "null".
fn get_column_as_string(row: &duckdb::Row<'_>, idx: usize) -> String {
    if let Ok(Some(s)) = row.get::<_, Option<String>>(idx) {
        return s;
    }
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(idx) {
        return n.to_string();
    }
    if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
        return f.to_string();
    }
    if let Ok(Some(b)) = row.get::<_, Option<bool>>(idx) {
        return b.to_string();
    }
    "null".to_string()
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        log::debug!("duckdb: {sql}");
        self.execute_sync(sql, &[])
    }

    async fn execute_with_params(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        log::debug!("duckdb: {sql} {params:?}");
        self.execute_sync(sql, params)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        log::debug!("duckdb: {sql}");
        self.execute_batch_sync(sql)
    }

    async fn fetch(&self, sql: &str) -> DbResult<Vec<Vec<String>>> {
        self.fetch_sync(sql)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn begin(&self) -> DbResult<()> {
        self.transaction_sync("BEGIN TRANSACTION")
    }

    async fn commit(&self) -> DbResult<()> {
        self.transaction_sync("COMMIT")
    }

    async fn rollback(&self) -> DbResult<()> {
        self.transaction_sync("ROLLBACK")
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
