//! Terminal implementation of the confirmation seam

use dialoguer::{Confirm, Input};
use sl_migrate::{AutoPrompt, Prompt};
use std::io::{self, IsTerminal};

/// Asks on the controlling terminal
#[derive(Debug, Default)]
pub(crate) struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(io::Error::other)
    }

    fn input(&mut self, question: &str, default: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(question)
            .default(default.to_string())
            .interact_text()
            .map_err(io::Error::other)
    }

    fn show(&mut self, text: &str) {
        println!("{text}");
    }
}

/// `--yes` answers everything; otherwise ask on the terminal when there is one.
///
/// Returns `None` when confirmation is needed but stdin is not a terminal.
pub(crate) fn confirmer(yes: bool) -> Option<Box<dyn Prompt>> {
    if yes {
        Some(Box::new(AutoPrompt::yes()))
    } else if io::stdin().is_terminal() {
        Some(Box::new(TerminalPrompt))
    } else {
        None
    }
}
