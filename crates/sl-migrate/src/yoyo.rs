//! Import a project managed by yoyo-migrations.
//!
//! yoyo keeps the apply half in `<id>.sql` and the rollback half in
//! `<id>.rollback.sql`. Conversion folds both into one declarative file
//! with marker sections. History import copies `_yoyo_migration` rows into
//! the ledger; both tools key rows by the SHA-256 of the id.

use crate::error::{MigrateError, MigrateResult};
use regex::Regex;
use sl_core::header::{APPLY_MARKER, ROLLBACK_MARKER};
use sl_db::{ledger, Database, DbError};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Table yoyo records applied migrations in
pub const YOYO_TABLE: &str = "_yoyo_migration";

const ROLLBACK_SUFFIX: &str = ".rollback.sql";

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".*--(.*)\s-- depends:(.*)\s").expect("valid regex"))
}

/// Fold a yoyo apply file and its optional rollback file into one
/// declarative migration.
///
/// The message and `depends:` header is only taken from the first two lines
/// of the apply file; header lines anywhere else are dropped.
pub fn convert_sql(apply: &str, rollback: &str) -> String {
    let leading = header_re()
        .captures(apply)
        .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0));
    let (message, depends) = match leading {
        Some(caps) => (
            format!("-- {}", caps[1].trim()),
            format!("-- depends: {}", caps[2].trim()),
        ),
        None => ("--".to_string(), "-- depends:".to_string()),
    };

    let apply = header_re().replace_all(apply, "");
    let rollback = header_re().replace_all(rollback, "");
    [
        message.as_str(),
        depends.as_str(),
        "",
        APPLY_MARKER,
        "",
        apply.trim(),
        "",
        ROLLBACK_MARKER,
        "",
        rollback.trim(),
    ]
    .join("\n")
}

/// Convert one yoyo `.sql` file.
///
/// Returns the converted text; the sibling `.rollback.sql` file, when
/// present, is read and deleted. The apply file itself is left for the
/// caller to overwrite.
pub fn convert_sql_file(path: &Path) -> MigrateResult<String> {
    let apply = std::fs::read_to_string(path).map_err(|e| MigrateError::io(path, e))?;
    let companion = rollback_path(path);
    let rollback = if companion.exists() {
        let text = std::fs::read_to_string(&companion)
            .map_err(|e| MigrateError::io(&companion, e))?;
        std::fs::remove_file(&companion).map_err(|e| MigrateError::io(&companion, e))?;
        text
    } else {
        String::new()
    };
    Ok(convert_sql(&apply, &rollback))
}

fn rollback_path(path: &Path) -> PathBuf {
    path.with_extension("rollback.sql")
}

/// What a directory conversion touched
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct YoyoReport {
    /// Files rewritten in place
    pub converted: Vec<PathBuf>,
    /// Files that need converting by hand
    pub skipped: Vec<PathBuf>,
}

/// Convert every yoyo migration in `dir`, in file name order.
///
/// Non-SQL migrations cannot be converted reliably and are reported in
/// [`YoyoReport::skipped`].
pub fn convert_directory(dir: &Path) -> MigrateResult<YoyoReport> {
    let entries = std::fs::read_dir(dir).map_err(|e| MigrateError::io(dir, e))?;
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| MigrateError::io(dir, e))?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut report = YoyoReport::default();
    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name.ends_with(ROLLBACK_SUFFIX) {
            continue;
        }
        if path.extension().is_some_and(|e| e == "sql") {
            let content = convert_sql_file(&path)?;
            std::fs::write(&path, content).map_err(|e| MigrateError::io(&path, e))?;
            log::info!("Converted {}", path.display());
            report.converted.push(path);
        } else {
            log::warn!(
                "{} cannot be converted reliably, update it by hand",
                path.display()
            );
            report.skipped.push(path);
        }
    }
    Ok(report)
}

/// Copy yoyo's applied history into the ledger.
///
/// Does nothing when the ledger already has rows. Returns the number of
/// rows copied.
pub async fn copy_history(db: &dyn Database) -> MigrateResult<usize> {
    if !db.relation_exists(YOYO_TABLE).await? {
        return Err(DbError::TableNotFound(YOYO_TABLE.to_string()).into());
    }
    ledger::ensure_tracking_store(db).await?;
    if !ledger::applied_migrations(db).await?.is_empty() {
        log::warn!("Migration history exists, skipping yoyo history import");
        return Ok(0);
    }

    let copied = db
        .execute(&format!(
            "INSERT INTO {} (migration_hash, migration_id, applied) \
             SELECT migration_hash, migration_id, applied_at_utc FROM {YOYO_TABLE}",
            ledger::LEDGER_TABLE
        ))
        .await?;
    log::info!("Copied {copied} yoyo history rows");
    Ok(copied)
}

#[cfg(test)]
#[path = "yoyo_test.rs"]
mod tests;
