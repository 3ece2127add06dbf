//! Operator confirmation seam for mark, unmark, remove and squash.

use std::collections::VecDeque;
use std::io;

/// Interactive yes/no and free-text questions
pub trait Prompt {
    /// Ask a yes/no question
    fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool>;

    /// Ask for a line of text
    fn input(&mut self, question: &str, default: &str) -> io::Result<String>;

    /// Show context the operator needs before answering
    fn show(&mut self, text: &str);
}

/// Answers every question the same way without asking
#[derive(Debug, Clone, Copy)]
pub struct AutoPrompt {
    answer: bool,
}

impl AutoPrompt {
    pub fn yes() -> Self {
        Self { answer: true }
    }

    pub fn no() -> Self {
        Self { answer: false }
    }
}

impl Prompt for AutoPrompt {
    fn confirm(&mut self, question: &str, _default: bool) -> io::Result<bool> {
        log::debug!("{question} -> {}", self.answer);
        Ok(self.answer)
    }

    fn input(&mut self, _question: &str, default: &str) -> io::Result<String> {
        Ok(default.to_string())
    }

    fn show(&mut self, _text: &str) {}
}

/// Replays a fixed list of answers and records what was asked.
///
/// Once the answers run out every question gets its default.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    pub asked: Vec<String>,
    pub shown: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool> {
        self.asked.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(default))
    }

    fn input(&mut self, question: &str, default: &str) -> io::Result<String> {
        self.asked.push(question.to_string());
        Ok(default.to_string())
    }

    fn show(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }
}
