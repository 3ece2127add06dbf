//! Merge runs of declarative migrations into single files.
//!
//! Apply statements are regrouped per target object in first-discovery
//! order, with data statements last. Rollback statements come out data
//! first, then objects in reverse, newest file first within each group.

use crate::batch::Batch;
use crate::error::{MigrateError, MigrateResult};
use crate::migration::{Migration, Runnable};
use crate::prompt::Prompt;
use crate::remove::{remove_migration, with_suffix};
use sl_core::header::{rewrite_depends, APPLY_MARKER, ROLLBACK_MARKER};
use sl_core::MigrationId;
use sl_sql::{Classifier, ParsedStatement, SqlError, StatementType};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Bucket holding every non-DDL statement
pub const DATA_BUCKET: &str = "__data";

/// Knobs for a squash
#[derive(Debug, Clone, Copy, Default)]
pub struct SquashOptions {
    /// Append `-- source: <id>` to each merged statement
    pub annotate_source: bool,
    /// Ask before keeping each UPDATE statement
    pub prompt_updates: bool,
    /// Offer to remove migrations that break a run
    pub prompt_unsquashable: bool,
    /// Keep originals as `.bak` files instead of deleting them
    pub backup: bool,
}

/// Insertion-ordered map of bucket name to contents
#[derive(Debug)]
struct Buckets<T> {
    order: Vec<String>,
    items: HashMap<String, T>,
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            items: HashMap::new(),
        }
    }
}

impl<T: Default> Buckets<T> {
    fn entry(&mut self, key: &str) -> &mut T {
        if !self.items.contains_key(key) {
            self.order.push(key.to_string());
        }
        self.items.entry(key.to_string()).or_default()
    }
}

impl<T> Buckets<T> {
    fn get(&self, key: &str) -> Option<&T> {
        self.items.get(key)
    }

    /// Object buckets in insertion order, without the data bucket
    fn objects(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .map(String::as_str)
            .filter(|k| *k != DATA_BUCKET)
    }
}

#[derive(Debug)]
struct Source {
    id: MigrationId,
    path: PathBuf,
    message: String,
    depends: Vec<MigrationId>,
}

/// Statements of one run, grouped by target object
#[derive(Debug, Default)]
pub struct SquashAccumulator {
    apply: Buckets<Vec<String>>,
    rollback: Buckets<Vec<Vec<String>>>,
    sources: Vec<Source>,
}

/// A merged file ready to replace its sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Id the merged file takes over, the latest source's
    pub id: MigrationId,
    /// Path of the latest source, where the merged file ends up
    pub target: PathBuf,
    pub content: String,
    /// Every source id, oldest first
    pub squashed: Vec<MigrationId>,
    /// Every source path, oldest first
    pub sources: Vec<PathBuf>,
}

impl Replacement {
    /// Where the merged file is staged before finalizing
    pub fn staging_path(&self) -> PathBuf {
        with_suffix(&self.target, ".squash")
    }

    /// Source ids that disappear, all but the latest
    pub fn retired(&self) -> impl Iterator<Item = &MigrationId> {
        self.squashed.iter().filter(move |id| **id != self.id)
    }
}

/// Result of squashing one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquashOutcome {
    /// The run held a single migration, nothing to do
    NoReplacement,
    Replacement(Replacement),
}

impl SquashAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of migrations merged so far
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Merge one declarative migration into the run
    pub fn add(
        &mut self,
        migration: &Migration,
        classifier: &Classifier,
        options: &SquashOptions,
        prompt: &mut dyn Prompt,
    ) -> MigrateResult<()> {
        self.add_with_depends(
            migration,
            migration.dependencies().to_vec(),
            classifier,
            options,
            prompt,
        )
    }

    fn add_with_depends(
        &mut self,
        migration: &Migration,
        depends: Vec<MigrationId>,
        classifier: &Classifier,
        options: &SquashOptions,
        prompt: &mut dyn Prompt,
    ) -> MigrateResult<()> {
        let sql = migration.sql().ok_or_else(|| {
            MigrateError::Squash(format!("{} is not a SQL migration", migration.id))
        })?;
        if !migration.uses_transaction() {
            return Err(MigrateError::Squash(format!(
                "{} runs outside a transaction",
                migration.id
            )));
        }

        let mut apply: Vec<(String, String)> = Vec::with_capacity(sql.apply.len());
        for (i, statement) in sql.apply.iter().enumerate() {
            let parsed = classify(classifier, migration, statement)?;
            let key = bucket_key(migration, &parsed)?;
            if parsed.statement_type == StatementType::Update && options.prompt_updates {
                let before = i.checked_sub(1).and_then(|j| sql.apply.get(j));
                let after = sql.apply.get(i + 1);
                let mut context = String::new();
                if let Some(prev) = before {
                    context.push_str(&format!("   {prev}\n"));
                }
                context.push_str(&format!(">> {statement}\n"));
                if let Some(next) = after {
                    context.push_str(&format!("   {next}\n"));
                }
                prompt.show(&context);
                if !prompt
                    .confirm("Include update statement", true)
                    .map_err(MigrateError::Prompt)?
                {
                    continue;
                }
            }
            apply.push((key, annotate(parsed.text, migration, options)));
        }

        let mut rollback: Buckets<Vec<String>> = Buckets::default();
        for statement in &sql.rollback {
            let parsed = classify(classifier, migration, statement)?;
            let key = bucket_key(migration, &parsed)?;
            rollback
                .entry(&key)
                .push(annotate(parsed.text, migration, options));
        }

        for (key, text) in apply {
            self.apply.entry(&key).push(text);
        }
        for key in &rollback.order {
            if let Some(statements) = rollback.items.remove(key) {
                self.rollback.entry(key).push(statements);
            }
        }
        self.sources.push(Source {
            id: migration.id.clone(),
            path: migration.path.clone(),
            message: migration.message().to_string(),
            depends,
        });
        Ok(())
    }

    /// Dependencies of the run on migrations outside it
    pub fn depends(&self) -> Vec<MigrationId> {
        let inside: HashSet<&MigrationId> = self.sources.iter().map(|s| &s.id).collect();
        let mut out: Vec<MigrationId> = Vec::new();
        for dep in self.sources.iter().flat_map(|s| &s.depends) {
            if !inside.contains(dep) && !out.contains(dep) {
                out.push(dep.clone());
            }
        }
        out
    }

    /// Text of the merged file, `None` for runs of fewer than two
    pub fn render(&self) -> Option<String> {
        if self.sources.len() < 2 {
            return None;
        }
        let latest = self.sources.last()?;

        let message = if latest.message.is_empty() {
            String::new()
        } else {
            format!(" {}", latest.message)
        };
        let depends: String = self.depends().iter().map(|d| format!(" {d}")).collect();
        let squashed = self.sources[..self.sources.len() - 1]
            .iter()
            .map(|s| s.id.as_str())
            .collect::<Vec<_>>()
            .join("\n-- squashed: ");

        Some(format!(
            "--{message}\n-- depends:{depends}\n\n-- squashed: {squashed}\n\n{APPLY_MARKER}\n\n{}\n\n{ROLLBACK_MARKER}\n\n{}\n",
            self.render_apply().join("\n\n"),
            self.render_rollback().join("\n\n"),
        ))
    }

    fn render_apply(&self) -> Vec<String> {
        let mut out = Vec::new();
        for key in self.apply.objects() {
            out.push(format!("-- Squash {key} statements."));
            out.extend(self.apply.get(key).into_iter().flatten().cloned());
        }
        if let Some(data) = self.apply.get(DATA_BUCKET).filter(|d| !d.is_empty()) {
            out.push("-- Squash data statements.".to_string());
            out.extend(data.iter().cloned());
        }
        out
    }

    fn render_rollback(&self) -> Vec<String> {
        let mut out = Vec::new();
        let newest_first = |per_file: &Vec<Vec<String>>| -> Vec<String> {
            per_file.iter().rev().flatten().cloned().collect()
        };

        if let Some(data) = self.rollback.get(DATA_BUCKET) {
            let statements = newest_first(data);
            if !statements.is_empty() {
                out.push("-- Squash data statements.".to_string());
                out.extend(statements);
            }
        }

        // Objects in apply discovery order, rollback-only objects after.
        let mut order: Vec<&str> = self
            .apply
            .objects()
            .filter(|k| self.rollback.get(k).is_some())
            .collect();
        for key in self.rollback.objects() {
            if !order.contains(&key) {
                order.push(key);
            }
        }
        for key in order.into_iter().rev() {
            out.push(format!("-- Squash {key} statements."));
            out.extend(self.rollback.get(key).map(newest_first).unwrap_or_default());
        }
        out
    }

    /// Close the run
    pub fn finish(self) -> SquashOutcome {
        let Some(content) = self.render() else {
            return SquashOutcome::NoReplacement;
        };
        let Some(latest) = self.sources.last() else {
            return SquashOutcome::NoReplacement;
        };
        SquashOutcome::Replacement(Replacement {
            id: latest.id.clone(),
            target: latest.path.clone(),
            content,
            squashed: self.sources.iter().map(|s| s.id.clone()).collect(),
            sources: self.sources.iter().map(|s| s.path.clone()).collect(),
        })
    }
}

fn classify(
    classifier: &Classifier,
    migration: &Migration,
    statement: &str,
) -> MigrateResult<ParsedStatement> {
    classifier
        .classify(statement)
        .map_err(|source| MigrateError::Classify {
            id: migration.id.to_string(),
            statement: statement.to_string(),
            source,
        })
}

/// Bucket for a statement; DDL without a target is an error
fn bucket_key(migration: &Migration, parsed: &ParsedStatement) -> MigrateResult<String> {
    if !parsed.statement_type.is_ddl() {
        return Ok(DATA_BUCKET.to_string());
    }
    parsed
        .identifier
        .clone()
        .ok_or_else(|| MigrateError::Classify {
            id: migration.id.to_string(),
            statement: parsed.text.clone(),
            source: SqlError::MissingIdentifier {
                statement_type: parsed.statement_type.to_string(),
                statement: parsed.text.clone(),
            },
        })
}

fn annotate(text: String, migration: &Migration, options: &SquashOptions) -> String {
    if options.annotate_source {
        format!("{text} -- source: {}", migration.id)
    } else {
        text
    }
}

/// Squash one contiguous, dependency-ordered run.
///
/// Every migration must be a transactional SQL migration. Files are not
/// touched; see [`write_staged`] and [`finalize`].
pub fn squash_run(
    run: &[&Migration],
    classifier: &Classifier,
    options: &SquashOptions,
    prompt: &mut dyn Prompt,
) -> MigrateResult<SquashOutcome> {
    let mut acc = SquashAccumulator::new();
    for migration in run {
        acc.add(migration, classifier, options, prompt)?;
    }
    Ok(acc.finish())
}

/// Write the merged file next to its target as `<target>.squash`
pub fn write_staged(replacement: &Replacement) -> MigrateResult<PathBuf> {
    let path = replacement.staging_path();
    std::fs::write(&path, &replacement.content).map_err(|e| MigrateError::io(&path, e))?;
    Ok(path)
}

/// Retire the sources and move the staged file onto the target path
pub fn finalize(replacement: &Replacement, backup: bool) -> MigrateResult<()> {
    for source in &replacement.sources {
        retire(source, backup)?;
    }
    let staged = replacement.staging_path();
    std::fs::rename(&staged, &replacement.target)
        .map_err(|e| MigrateError::io(&replacement.target, e))?;
    log::info!(
        "Squashed {} migrations into {}",
        replacement.squashed.len(),
        replacement.target.display()
    );
    Ok(())
}

/// Delete a migration file, or rename it to `.bak`
pub(crate) fn retire(path: &Path, backup: bool) -> MigrateResult<()> {
    if backup {
        let bak = with_suffix(path, ".bak");
        log::warn!("Backing up {} to {}", path.display(), bak.display());
        std::fs::rename(path, &bak).map_err(|e| MigrateError::io(path, e))
    } else {
        std::fs::remove_file(path).map_err(|e| MigrateError::io(path, e))
    }
}

/// What a batch squash changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SquashReport {
    pub replacements: Vec<Replacement>,
    /// Unsquashable migrations removed on request
    pub removed: Vec<MigrationId>,
    /// Migrations outside any run whose depends line was rewritten
    pub rewritten: Vec<MigrationId>,
}

/// Squash every run in the batch.
///
/// Script and non-transactional migrations break runs. All statements are
/// classified before any file is written, so a classification failure
/// leaves the directory untouched apart from requested removals.
pub fn squash_batch(
    batch: &Batch,
    classifier: &Classifier,
    options: &SquashOptions,
    prompt: &mut dyn Prompt,
) -> MigrateResult<SquashReport> {
    let order = batch.sorted()?;
    let mut report = SquashReport::default();
    let mut removed: HashMap<MigrationId, Vec<MigrationId>> = HashMap::new();
    let mut merged: HashMap<MigrationId, MigrationId> = HashMap::new();
    let mut acc = SquashAccumulator::new();

    for migration in &order {
        let depends = resolve_merged(resolve_removed(migration.dependencies(), &removed), &merged);
        if migration.is_sql() && migration.uses_transaction() {
            log::debug!("Squashing {}", migration.id);
            acc.add_with_depends(migration, depends, classifier, options, prompt)?;
            continue;
        }

        if options.prompt_unsquashable && offer_removal(batch, migration, &depends, options, prompt)? {
            removed.insert(migration.id.clone(), depends);
            report.removed.push(migration.id.clone());
            continue;
        }

        log::warn!("Skipping unsquashable migration {}", migration.id);
        close_run(&mut acc, &mut report, &mut merged);
    }
    close_run(&mut acc, &mut report, &mut merged);

    for replacement in &report.replacements {
        write_staged(replacement)?;
    }
    for replacement in &report.replacements {
        finalize(replacement, options.backup)?;
    }

    report.rewritten = repoint_dependents(&order, &report, &removed)?;
    Ok(report)
}

fn offer_removal(
    batch: &Batch,
    migration: &Migration,
    depends: &[MigrationId],
    options: &SquashOptions,
    prompt: &mut dyn Prompt,
) -> MigrateResult<bool> {
    if prompt
        .confirm(&format!("View unsquashable migration {}", migration.id), true)
        .map_err(MigrateError::Prompt)?
    {
        let text = std::fs::read_to_string(&migration.path)
            .map_err(|e| MigrateError::io(&migration.path, e))?;
        prompt.show(&text);
    }
    if !prompt
        .confirm(&format!("Remove unsquashable migration {}", migration.id), false)
        .map_err(MigrateError::Prompt)?
    {
        return Ok(false);
    }
    remove_migration(batch, migration, depends, options.backup)?;
    Ok(true)
}

/// Record every retired id against the id that replaces it
fn close_run(
    acc: &mut SquashAccumulator,
    report: &mut SquashReport,
    merged: &mut HashMap<MigrationId, MigrationId>,
) {
    let run = std::mem::take(acc);
    match run.finish() {
        SquashOutcome::Replacement(replacement) => {
            for id in replacement.retired() {
                merged.insert(id.clone(), replacement.id.clone());
            }
            report.replacements.push(replacement);
        }
        SquashOutcome::NoReplacement => {}
    }
}

/// Replace ids retired by an earlier run with that run's id
fn resolve_merged(
    depends: Vec<MigrationId>,
    merged: &HashMap<MigrationId, MigrationId>,
) -> Vec<MigrationId> {
    let mut out: Vec<MigrationId> = Vec::with_capacity(depends.len());
    for dep in depends {
        let id = merged.get(&dep).cloned().unwrap_or(dep);
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Replace removed ids by what they depended on
fn resolve_removed(
    depends: &[MigrationId],
    removed: &HashMap<MigrationId, Vec<MigrationId>>,
) -> Vec<MigrationId> {
    let mut out: Vec<MigrationId> = Vec::with_capacity(depends.len());
    for dep in depends {
        let replacement = removed.get(dep).map_or(std::slice::from_ref(dep), Vec::as_slice);
        for id in replacement {
            if !out.contains(id) {
                out.push(id.clone());
            }
        }
    }
    out
}

/// Point migrations outside the squashed runs at the replacement ids
fn repoint_dependents(
    order: &[&Migration],
    report: &SquashReport,
    removed: &HashMap<MigrationId, Vec<MigrationId>>,
) -> MigrateResult<Vec<MigrationId>> {
    let mut retired: Vec<(&MigrationId, &MigrationId)> = Vec::new();
    let mut gone: HashSet<&MigrationId> = removed.keys().collect();
    for replacement in &report.replacements {
        for id in replacement.retired() {
            retired.push((id, &replacement.id));
            gone.insert(id);
        }
        gone.insert(&replacement.id);
    }

    let mut rewritten = Vec::new();
    for migration in order.iter().filter(|m| !gone.contains(&m.id)) {
        let path = &migration.path;
        let mut text = std::fs::read_to_string(path).map_err(|e| MigrateError::io(path, e))?;
        let mut changed = false;
        for (old, new) in &retired {
            if let Some(updated) = rewrite_depends(&text, old.as_str(), std::slice::from_ref(*new)) {
                text = updated;
                changed = true;
            }
        }
        if changed {
            std::fs::write(path, &text).map_err(|e| MigrateError::io(path, e))?;
            log::info!("Updated dependencies of {}", migration.id);
            rewritten.push(migration.id.clone());
        }
    }
    Ok(rewritten)
}

#[cfg(test)]
#[path = "squash_test.rs"]
mod tests;
