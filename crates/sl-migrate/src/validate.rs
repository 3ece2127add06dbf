//! Classify every declarative statement without touching files.

use crate::batch::Batch;
use crate::error::MigrateResult;
use serde::Serialize;
use sl_core::MigrationId;
use sl_sql::{Classifier, SqlError};

/// One statement that could not be classified
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub id: MigrationId,
    pub section: &'static str,
    pub statement: String,
    pub error: String,
    #[serde(skip)]
    pub source: SqlError,
}

/// Aggregated classifier results for a batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Declarative migrations checked
    pub migrations: usize,
    /// Statements checked
    pub statements: usize,
    /// Script migrations, which carry no statements to check
    pub skipped: Vec<MigrationId>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Run the classifier over the apply and rollback statements of every
/// declarative migration, in dependency order, collecting every failure.
pub fn validate(batch: &Batch, classifier: &Classifier) -> MigrateResult<ValidationReport> {
    let mut report = ValidationReport::default();
    for migration in batch.sorted()? {
        let Some(sql) = migration.sql() else {
            report.skipped.push(migration.id.clone());
            continue;
        };
        report.migrations += 1;
        let sections = [("apply", &sql.apply), ("rollback", &sql.rollback)];
        for (section, statements) in sections {
            for statement in statements {
                report.statements += 1;
                if let Err(source) = classifier.classify(statement) {
                    log::debug!("{}: {source}", migration.id);
                    report.issues.push(ValidationIssue {
                        id: migration.id.clone(),
                        section,
                        statement: statement.clone(),
                        error: source.to_string(),
                        source,
                    });
                }
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
