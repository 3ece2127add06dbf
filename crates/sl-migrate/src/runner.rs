//! Apply and roll back a batch against a database.
//!
//! Each migration gets at most one transaction of its own, so a failure
//! part way through a run leaves earlier migrations committed.

use crate::batch::Batch;
use crate::error::{MigrateError, MigrateResult};
use crate::migration::{Migration, MigrationKind, Runnable};
use crate::prompt::Prompt;
use serde::Serialize;
use sl_core::MigrationId;
use sl_db::{ledger, Database, DbResult};
use std::fmt;

/// Which way a run walks the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Apply,
    Rollback,
}

/// Per-migration state within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MigrationState {
    Pending,
    Running,
    Committed,
    Failed,
}

/// State of a run as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    InProgress,
    Completed,
    Aborted,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of one migration in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    pub id: MigrationId,
    pub state: MigrationState,
}

/// Everything a run touched, with terminal states
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub direction: Direction,
    pub status: RunStatus,
    pub migrations: Vec<MigrationOutcome>,
}

impl RunReport {
    fn new(direction: Direction, planned: &[&Migration]) -> Self {
        Self {
            direction,
            status: RunStatus::InProgress,
            migrations: planned
                .iter()
                .map(|m| MigrationOutcome {
                    id: m.id.clone(),
                    state: MigrationState::Pending,
                })
                .collect(),
        }
    }

    fn transition(&mut self, index: usize, state: MigrationState) {
        if let Some(outcome) = self.migrations.get_mut(index) {
            log::info!("{}: {} -> {}", outcome.id, outcome.state, state);
            outcome.state = state;
        }
    }

    fn finish(&mut self, status: RunStatus) {
        log::info!("{:?} run {} -> {}", self.direction, self.status, status);
        self.status = status;
    }

    /// Ids that reached `Committed`
    pub fn committed(&self) -> Vec<&MigrationId> {
        self.migrations
            .iter()
            .filter(|o| o.state == MigrationState::Committed)
            .map(|o| &o.id)
            .collect()
    }

    pub fn is_noop(&self) -> bool {
        self.migrations.is_empty()
    }
}

/// Apply every migration not yet in the ledger, in dependency order.
///
/// Applying a fully applied batch does nothing.
pub async fn apply(batch: &mut Batch, db: &dyn Database) -> MigrateResult<RunReport> {
    batch.refresh_applied(db).await?;
    let order = batch.sorted()?;
    let planned: Vec<&Migration> = order.into_iter().filter(|m| !m.applied).collect();
    for m in &planned {
        m.ensure_runnable()?;
    }
    ledger::ensure_tracking_store(db).await?;

    run(db, Direction::Apply, &planned).await
}

/// Roll back applied migrations in reverse dependency order.
///
/// `count` limits how many are rolled back; `None` or `Some(0)` means all.
pub async fn rollback(
    batch: &mut Batch,
    db: &dyn Database,
    count: Option<usize>,
) -> MigrateResult<RunReport> {
    batch.refresh_applied(db).await?;
    let limit = match count {
        None | Some(0) => usize::MAX,
        Some(n) => n,
    };
    let order = batch.sorted()?;
    let planned: Vec<&Migration> = order
        .into_iter()
        .rev()
        .filter(|m| m.applied)
        .take(limit)
        .collect();
    for m in &planned {
        m.ensure_runnable()?;
    }
    ledger::ensure_tracking_store(db).await?;

    run(db, Direction::Rollback, &planned).await
}

async fn run(
    db: &dyn Database,
    direction: Direction,
    planned: &[&Migration],
) -> MigrateResult<RunReport> {
    let mut report = RunReport::new(direction, planned);
    if planned.is_empty() {
        log::info!("Nothing to {direction:?}");
    }

    for (i, m) in planned.iter().enumerate() {
        report.transition(i, MigrationState::Running);
        match run_one(db, m, direction).await {
            Ok(()) => report.transition(i, MigrationState::Committed),
            Err(source) => {
                report.transition(i, MigrationState::Failed);
                report.finish(RunStatus::Aborted);
                let id = m.id.to_string();
                return Err(match direction {
                    Direction::Apply => MigrateError::Apply { id, source },
                    Direction::Rollback => MigrateError::Rollback { id, source },
                });
            }
        }
    }

    report.finish(RunStatus::Completed);
    Ok(report)
}

/// Run one migration and its ledger write inside its own transaction
async fn run_one(db: &dyn Database, m: &Migration, direction: Direction) -> DbResult<()> {
    match direction {
        Direction::Apply => log::info!("Applying {}", m.id),
        Direction::Rollback => log::info!("Rolling back {}", m.id),
    }

    if !m.uses_transaction() {
        return run_body(db, m, direction).await;
    }

    db.begin().await?;
    match run_body(db, m, direction).await {
        Ok(()) => {
            if let Err(e) = db.commit().await {
                if let Err(rb) = db.rollback().await {
                    log::warn!("Rollback of {} after failed commit failed: {rb}", m.id);
                }
                return Err(e);
            }
            Ok(())
        }
        Err(e) => {
            if let Err(rb) = db.rollback().await {
                log::warn!("Rollback of {} failed: {rb}", m.id);
            }
            Err(e)
        }
    }
}

async fn run_body(db: &dyn Database, m: &Migration, direction: Direction) -> DbResult<()> {
    match direction {
        Direction::Apply => {
            m.apply(db).await?;
            ledger::record_applied(db, &m.hash, m.id.as_str()).await
        }
        Direction::Rollback => {
            m.rollback(db).await?;
            ledger::record_unapplied(db, &m.hash).await
        }
    }
}

/// Record migrations as applied without running them.
///
/// Walks unapplied migrations in dependency order, confirming each; the
/// first declined migration ends the walk. `only` restricts the walk when
/// non-empty. All ledger writes share one transaction.
pub async fn mark(
    batch: &mut Batch,
    db: &dyn Database,
    only: &[MigrationId],
    prompt: &mut dyn Prompt,
) -> MigrateResult<Vec<MigrationId>> {
    batch.refresh_applied(db).await?;
    let candidates: Vec<&Migration> = batch
        .sorted()?
        .into_iter()
        .filter(|m| !m.applied && (only.is_empty() || only.contains(&m.id)))
        .collect();
    ledger_walk(db, &candidates, Direction::Apply, prompt).await
}

/// Remove migrations from the ledger without rolling them back.
///
/// The reverse of [`mark`]: applied migrations, newest first.
pub async fn unmark(
    batch: &mut Batch,
    db: &dyn Database,
    only: &[MigrationId],
    prompt: &mut dyn Prompt,
) -> MigrateResult<Vec<MigrationId>> {
    batch.refresh_applied(db).await?;
    let candidates: Vec<&Migration> = batch
        .sorted()?
        .into_iter()
        .rev()
        .filter(|m| m.applied && (only.is_empty() || only.contains(&m.id)))
        .collect();
    ledger_walk(db, &candidates, Direction::Rollback, prompt).await
}

async fn ledger_walk(
    db: &dyn Database,
    candidates: &[&Migration],
    direction: Direction,
    prompt: &mut dyn Prompt,
) -> MigrateResult<Vec<MigrationId>> {
    ledger::ensure_tracking_store(db).await?;
    db.begin().await?;
    let result = ledger_walk_body(db, candidates, direction, prompt).await;
    match result {
        Ok(changed) => {
            db.commit().await?;
            Ok(changed)
        }
        Err(e) => {
            if let Err(rb) = db.rollback().await {
                log::warn!("Rollback of ledger changes failed: {rb}");
            }
            Err(e)
        }
    }
}

async fn ledger_walk_body(
    db: &dyn Database,
    candidates: &[&Migration],
    direction: Direction,
    prompt: &mut dyn Prompt,
) -> MigrateResult<Vec<MigrationId>> {
    let mut changed = Vec::new();
    for m in candidates {
        let question = match direction {
            Direction::Apply => format!("Mark {} as applied?", m.id),
            Direction::Rollback => format!("Unmark {} as applied?", m.id),
        };
        if !prompt.confirm(&question, true).map_err(MigrateError::Prompt)? {
            break;
        }
        match direction {
            Direction::Apply => ledger::record_applied(db, &m.hash, m.id.as_str()).await?,
            Direction::Rollback => ledger::record_unapplied(db, &m.hash).await?,
        }
        log::info!("{} ledger entry for {}", direction_verb(direction), m.id);
        changed.push(m.id.clone());
    }
    Ok(changed)
}

fn direction_verb(direction: Direction) -> &'static str {
    match direction {
        Direction::Apply => "Added",
        Direction::Rollback => "Removed",
    }
}

/// One row of the migration history listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub applied: bool,
    pub id: MigrationId,
    pub kind: MigrationKind,
    pub message: String,
}

impl HistoryEntry {
    /// `A` for applied, `U` for unapplied
    pub fn status(&self) -> &'static str {
        if self.applied {
            "A"
        } else {
            "U"
        }
    }
}

/// Every migration in dependency order with its applied snapshot
pub fn history(batch: &Batch) -> MigrateResult<Vec<HistoryEntry>> {
    Ok(batch
        .sorted()?
        .into_iter()
        .map(|m| HistoryEntry {
            applied: m.applied,
            id: m.id.clone(),
            kind: m.kind,
            message: m.message().to_string(),
        })
        .collect())
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
