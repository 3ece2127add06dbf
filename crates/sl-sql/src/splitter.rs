//! Comment-aware statement splitter.
//!
//! Statements are cut at top-level semicolons found by the dialect's
//! tokenizer, so semicolons inside strings, quoted identifiers, comments and
//! dollar-quoted bodies never split a statement. Each statement keeps its
//! original text and always ends with exactly one `;`.

use sqlparser::tokenizer::{Location, Token};

use crate::dialect::SqlDialect;
use crate::error::SqlResult;

/// Split a section of SQL text into individual statements.
///
/// Comments and whitespace between statements are dropped; comments inside
/// a statement are kept verbatim.
pub fn split_statements(dialect: &dyn SqlDialect, sql: &str) -> SqlResult<Vec<String>> {
    let tokens = dialect.tokenize(sql)?;
    let lines = LineIndex::new(sql);

    let mut statements = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;

    for (i, tok) in tokens.iter().enumerate() {
        match &tok.token {
            Token::Whitespace(_) => {}
            Token::SemiColon => {
                if let Some(s) = start.take() {
                    statements.push(terminated(&sql[s..end]));
                }
            }
            _ => {
                if start.is_none() {
                    start = Some(lines.offset(sql, tok.span.start));
                }
                end = tokens
                    .get(i + 1)
                    .map_or(sql.len(), |next| lines.offset(sql, next.span.start));
            }
        }
    }
    if let Some(s) = start {
        statements.push(terminated(&sql[s..end]));
    }
    Ok(statements)
}

fn terminated(body: &str) -> String {
    format!("{};", body.trim_end())
}

/// Append a terminating `;` to the last statement if it lacks one
pub fn ensure_terminated(statements: &mut [String]) {
    if let Some(last) = statements.last_mut() {
        if !last.trim_end().ends_with(';') {
            let trimmed = last.trim_end().len();
            last.truncate(trimmed);
            last.push(';');
        }
    }
}

/// Byte offsets of line starts, for turning token locations into slices
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// Byte offset of a 1-based line/column location
    fn offset(&self, text: &str, loc: Location) -> usize {
        let line = (loc.line as usize).saturating_sub(1);
        let Some(&line_start) = self.starts.get(line) else {
            return text.len();
        };
        let column = (loc.column as usize).saturating_sub(1);
        text[line_start..]
            .char_indices()
            .nth(column)
            .map_or(text.len(), |(i, _)| line_start + i)
    }
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
