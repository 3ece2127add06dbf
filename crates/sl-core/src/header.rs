//! Migration file grammar.
//!
//! A declarative migration is one text file split by two marker lines:
//!
//! ```text
//! -- create the users table
//! -- depends: 20240101_01_abcde-init
//! -- transaction: false
//!
//! -- migrate: apply
//! CREATE TABLE users (id INT);
//!
//! -- migrate: rollback
//! DROP TABLE users;
//! ```
//!
//! A script migration carries the same metadata in a leading block of
//! `//!` lines.

use crate::error::{LoadError, LoadResult};
use crate::migration_id::MigrationId;
use regex::Regex;
use std::sync::OnceLock;

/// Marker line that opens the apply section
pub const APPLY_MARKER: &str = "-- migrate: apply";

/// Marker line that opens the rollback section
pub const ROLLBACK_MARKER: &str = "-- migrate: rollback";

/// Metadata shared by both migration forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationHeader {
    /// Short human-readable description
    pub message: String,
    /// Raw dependency ids, in declaration order
    pub depends: Vec<MigrationId>,
    /// False when the file opts out of the wrapping transaction
    pub use_transaction: bool,
}

/// A declarative file split into header and sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarativeSource {
    pub header: MigrationHeader,
    /// Raw text between the apply and rollback markers
    pub apply: String,
    /// Raw text after the rollback marker
    pub rollback: String,
}

fn header_re() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"(?m)^--(?P<message>[^\n]*)\n--[ \t]*depends:(?P<depends>[^\n]*)$")
            .expect("valid regex")
    })
}

fn transaction_re() -> &'static Regex {
    static TRANSACTION: OnceLock<Regex> = OnceLock::new();
    TRANSACTION.get_or_init(|| {
        Regex::new(r"(?mi)^(?:--|//!)[ \t]*transaction:[ \t]*(?P<flag>\S+)[ \t]*$")
            .expect("valid regex")
    })
}

fn depends_line_re() -> &'static Regex {
    static DEPENDS: OnceLock<Regex> = OnceLock::new();
    DEPENDS.get_or_init(|| {
        Regex::new(r"(?m)^(?P<prefix>--|//!)[ \t]*depends:(?P<ids>[^\n]*?)(?P<cr>\r?)$")
            .expect("valid regex")
    })
}

/// Split a declarative migration into header and sections.
///
/// `file` is only used to name the file in errors.
pub fn parse_declarative(file: &str, text: &str) -> LoadResult<DeclarativeSource> {
    let apply = single_marker(file, text, APPLY_MARKER)?
        .ok_or_else(|| LoadError::MissingApplyMarker { file: file.into() })?;
    let rollback = single_marker(file, text, ROLLBACK_MARKER)?
        .ok_or_else(|| LoadError::MissingRollbackMarker { file: file.into() })?;
    if rollback.0 < apply.1 {
        return Err(LoadError::MarkersOutOfOrder { file: file.into() });
    }

    let header_text = normalize_newlines(&text[..apply.0]);
    let caps = header_re()
        .captures(&header_text)
        .ok_or_else(|| LoadError::InvalidHeader { file: file.into() })?;

    let header = MigrationHeader {
        message: caps["message"].trim().to_string(),
        depends: parse_ids(&caps["depends"]),
        use_transaction: use_transaction(&header_text),
    };

    Ok(DeclarativeSource {
        header,
        apply: text[apply.1..rollback.0].to_string(),
        rollback: text[rollback.1..].to_string(),
    })
}

/// Read the `//!` metadata block at the top of a script migration.
pub fn parse_script_header(file: &str, text: &str) -> LoadResult<MigrationHeader> {
    let block: Vec<&str> = text
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .take_while(|line| line.trim_start().starts_with("//!"))
        .map(|line| {
            let body = line.trim_start().trim_start_matches("//!");
            body.strip_prefix(' ').unwrap_or(body).trim_end()
        })
        .collect();

    let mut message = None;
    let mut depends = None;
    for line in &block {
        if let Some(ids) = line.strip_prefix("depends:") {
            depends = Some(parse_ids(ids));
        } else if line.starts_with("transaction:") {
            continue;
        } else if message.is_none() && !line.is_empty() {
            message = Some(line.to_string());
        }
    }

    let depends = depends.ok_or_else(|| LoadError::InvalidScriptHeader { file: file.into() })?;
    Ok(MigrationHeader {
        message: message.unwrap_or_default(),
        depends,
        use_transaction: use_transaction(&block_as_comments(&block)),
    })
}

/// Replace `removed` in the header's depends line with `replacement`.
///
/// Ids already listed are not repeated. Returns `None` when the text has no
/// depends line naming `removed`.
pub fn rewrite_depends(text: &str, removed: &str, replacement: &[MigrationId]) -> Option<String> {
    let caps = depends_line_re().captures(text)?;
    let ids = parse_ids(&caps["ids"]);
    if !ids.iter().any(|id| id == removed) {
        return None;
    }

    let mut rewritten: Vec<MigrationId> = Vec::with_capacity(ids.len() + replacement.len());
    for id in ids {
        if id == removed {
            for r in replacement {
                if !rewritten.contains(r) {
                    rewritten.push(r.clone());
                }
            }
        } else if !rewritten.contains(&id) {
            rewritten.push(id);
        }
    }

    let whole = caps.get(0)?;
    let line = format!(
        "{} {}{}",
        &caps["prefix"],
        depends_value(&rewritten),
        &caps["cr"]
    );
    let mut out = String::with_capacity(text.len() + line.len());
    out.push_str(&text[..whole.start()]);
    out.push_str(&line);
    out.push_str(&text[whole.end()..]);
    Some(out)
}

/// `depends:` followed by the ids, space separated
fn depends_value(ids: &[MigrationId]) -> String {
    if ids.is_empty() {
        "depends:".to_string()
    } else {
        let joined: Vec<&str> = ids.iter().map(MigrationId::as_str).collect();
        format!("depends: {}", joined.join(" "))
    }
}

/// Skeleton for a new declarative migration
pub fn declarative_template(message: &str, depends: &[MigrationId]) -> String {
    format!(
        "-- {message}\n-- {}\n\n{APPLY_MARKER}\n\n{ROLLBACK_MARKER}\n\n",
        depends_value(depends)
    )
}

/// Locate the one line equal to `marker`, as a byte range
fn single_marker(file: &str, text: &str, marker: &str) -> LoadResult<Option<(usize, usize)>> {
    let mut found = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim() == marker {
            found.push((offset, offset + line.len()));
        }
        offset += line.len();
    }
    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        count => Err(LoadError::DuplicateMarker {
            file: file.into(),
            marker: marker.into(),
            count,
        }),
    }
}

fn parse_ids(raw: &str) -> Vec<MigrationId> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter_map(MigrationId::try_new)
        .collect()
}

fn use_transaction(header: &str) -> bool {
    match transaction_re().captures(header) {
        Some(caps) => !matches!(
            caps["flag"].to_ascii_lowercase().as_str(),
            "false" | "no" | "off" | "0"
        ),
        None => true,
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

fn block_as_comments(block: &[&str]) -> String {
    block
        .iter()
        .map(|line| format!("//! {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "header_test.rs"]
mod tests;
