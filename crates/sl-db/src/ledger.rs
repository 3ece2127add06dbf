//! Tracking tables that record applied migrations.
//!
//! `_sluice_migration` holds one row per applied migration, keyed by the
//! hash of its id. `_sluice_version` records the layout version of the
//! tracking tables themselves.

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use chrono::{NaiveDateTime, Utc};
use std::collections::HashSet;

/// Name of the applied-migrations table
pub const LEDGER_TABLE: &str = "_sluice_migration";

/// Name of the tracking-layout version table
pub const VERSION_TABLE: &str = "_sluice_version";

/// Current layout version of the tracking tables
pub const LEDGER_VERSION: i32 = 0;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One applied migration as recorded in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub hash: String,
    pub id: String,
    pub applied_at: Option<NaiveDateTime>,
}

fn now() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

/// Create the tracking tables when they do not exist yet.
///
/// Safe to call on every run.
pub async fn ensure_tracking_store(db: &dyn Database) -> DbResult<()> {
    if !db.relation_exists(VERSION_TABLE).await? {
        log::info!("Creating tracking table {VERSION_TABLE}");
        db.execute(&format!(
            "CREATE TABLE {VERSION_TABLE} (
                 version   INTEGER PRIMARY KEY,
                 installed TIMESTAMP NOT NULL
             )"
        ))
        .await?;
        db.execute_with_params(
            &format!("INSERT INTO {VERSION_TABLE} VALUES (?, CAST(? AS TIMESTAMP))"),
            &[&LEDGER_VERSION.to_string(), &now()],
        )
        .await?;
    }

    if !db.relation_exists(LEDGER_TABLE).await? {
        log::info!("Creating tracking table {LEDGER_TABLE}");
        db.execute(&format!(
            "CREATE TABLE {LEDGER_TABLE} (
                 migration_hash VARCHAR PRIMARY KEY,
                 migration_id   VARCHAR NOT NULL,
                 applied        TIMESTAMP NOT NULL
             )"
        ))
        .await?;
    }
    Ok(())
}

/// Every ledger row, oldest first
pub async fn applied_migrations(db: &dyn Database) -> DbResult<Vec<LedgerEntry>> {
    let rows = db
        .fetch(&format!(
            "SELECT migration_hash, migration_id, CAST(applied AS VARCHAR) \
             FROM {LEDGER_TABLE} ORDER BY applied, migration_id"
        ))
        .await?;

    rows.into_iter()
        .map(|row| {
            let mut cols = row.into_iter();
            match (cols.next(), cols.next(), cols.next()) {
                (Some(hash), Some(id), Some(applied)) => Ok(LedgerEntry {
                    hash,
                    id,
                    applied_at: parse_timestamp(&applied),
                }),
                _ => Err(DbError::ExecutionError(format!(
                    "unexpected row shape in {LEDGER_TABLE}"
                ))),
            }
        })
        .collect()
}

/// Hashes of every applied migration
pub async fn applied_hashes(db: &dyn Database) -> DbResult<HashSet<String>> {
    Ok(applied_migrations(db)
        .await?
        .into_iter()
        .map(|entry| entry.hash)
        .collect())
}

/// Record `id` as applied. Recording an already-applied hash is a no-op.
pub async fn record_applied(db: &dyn Database, hash: &str, id: &str) -> DbResult<()> {
    db.execute_with_params(
        &format!(
            "INSERT INTO {LEDGER_TABLE} (migration_hash, migration_id, applied) \
             VALUES (?, ?, CAST(? AS TIMESTAMP)) ON CONFLICT DO NOTHING"
        ),
        &[hash, id, &now()],
    )
    .await?;
    Ok(())
}

/// Remove the ledger row for `hash`, if any
pub async fn record_unapplied(db: &dyn Database, hash: &str) -> DbResult<()> {
    db.execute_with_params(
        &format!("DELETE FROM {LEDGER_TABLE} WHERE migration_hash = ?"),
        &[hash],
    )
    .await?;
    Ok(())
}

/// Highest recorded layout version, or `None` before the store exists
pub async fn schema_version(db: &dyn Database) -> DbResult<Option<i32>> {
    if !db.relation_exists(VERSION_TABLE).await? {
        return Ok(None);
    }
    let rows = db
        .fetch(&format!("SELECT MAX(version) FROM {VERSION_TABLE}"))
        .await?;
    Ok(rows
        .first()
        .and_then(|row| row.first())
        .and_then(|v| v.parse().ok()))
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
