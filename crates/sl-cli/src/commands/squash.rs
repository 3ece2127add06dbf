//! Squash command implementation

use anyhow::Result;
use sl_core::config::SquashConfig;
use sl_migrate::{squash_batch, AutoPrompt, Prompt, SquashOptions};
use std::io::{self, IsTerminal};

use crate::cli::{GlobalArgs, SquashArgs};
use crate::commands::common::{load_batch, load_project, plural};
use crate::commands::prompt::TerminalPrompt;

/// Execute the squash command
pub async fn execute(args: &SquashArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let classifier = project.classifier()?;
    let batch = load_batch(&project, &classifier)?;

    let mut opts = options(args, &project.config.squash);

    let interactive = io::stdin().is_terminal();
    if !interactive && (opts.prompt_updates || opts.prompt_unsquashable) {
        log::warn!("stdin is not a terminal, squashing without prompts");
        opts.prompt_updates = false;
        opts.prompt_unsquashable = false;
    }
    let mut prompt: Box<dyn Prompt> = if interactive {
        Box::new(TerminalPrompt)
    } else {
        Box::new(AutoPrompt::no())
    };

    let report = squash_batch(&batch, &classifier, &opts, prompt.as_mut())?;

    if report.replacements.is_empty() && report.removed.is_empty() {
        println!("Nothing to squash.");
        return Ok(());
    }
    for replacement in &report.replacements {
        println!(
            "Squashed {} into {}",
            plural(replacement.squashed.len(), "migration"),
            replacement.target.display()
        );
    }
    for id in &report.removed {
        println!("Removed {id}");
    }
    for id in &report.rewritten {
        println!("  Updated depends of {id}");
    }
    Ok(())
}

/// Flags win over sluice.yml; both prompts are off unless asked for
fn options(args: &SquashArgs, defaults: &SquashConfig) -> SquashOptions {
    SquashOptions {
        annotate_source: args.source || defaults.annotate_source,
        prompt_updates: args.update_prompt,
        prompt_unsquashable: args.skip_prompt,
        backup: args.backup || defaults.backup,
    }
}

#[cfg(test)]
#[path = "squash_test.rs"]
mod tests;
