//! Statement classification.
//!
//! Each statement is classified by type and, for DDL, by the object it
//! targets. The primary tier parses with sqlparser and reads the target from
//! the AST. Statements the parser does not model (`CREATE AGGREGATE`,
//! `CREATE EXTENSION`, `DROP INDEX CONCURRENTLY`, ...) are handed to a
//! token-walk tier that finds the object keyword and reads the name after it.

use std::fmt;
use std::ops::ControlFlow;

use serde::Serialize;
use sqlparser::ast::{visit_relations, Ident, ObjectName, SchemaName, Statement};
use sqlparser::tokenizer::{Token, TokenWithSpan};

use crate::dialect::{PostgresDialect, SqlDialect};
use crate::error::{SqlError, SqlResult};

/// Statement category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementType {
    Create,
    Alter,
    Drop,
    Update,
    Insert,
    Delete,
    Other,
}

impl StatementType {
    /// CREATE, ALTER and DROP change object definitions
    pub fn is_ddl(self) -> bool {
        matches!(
            self,
            StatementType::Create | StatementType::Alter | StatementType::Drop
        )
    }

    fn from_keyword(word: &str) -> Self {
        match word.to_ascii_uppercase().as_str() {
            "CREATE" => StatementType::Create,
            "ALTER" => StatementType::Alter,
            "DROP" => StatementType::Drop,
            "UPDATE" => StatementType::Update,
            "INSERT" => StatementType::Insert,
            "DELETE" => StatementType::Delete,
            _ => StatementType::Other,
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatementType::Create => "CREATE",
            StatementType::Alter => "ALTER",
            StatementType::Drop => "DROP",
            StatementType::Update => "UPDATE",
            StatementType::Insert => "INSERT",
            StatementType::Delete => "DELETE",
            StatementType::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// One classified statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedStatement {
    pub text: String,
    pub statement_type: StatementType,
    /// Target object; always present for DDL
    pub identifier: Option<String>,
}

/// Keywords introducing the object a DDL statement targets
const OBJECT_KEYWORDS: &[&str] = &[
    "TABLE",
    "VIEW",
    "INDEX",
    "SCHEMA",
    "EXTENSION",
    "AGGREGATE",
    "SEQUENCE",
    "FUNCTION",
    "TYPE",
];

/// Words that may not name an object unless quoted
const RESERVED_IDENTIFIERS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
    "case", "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
    "current_date", "current_role", "current_time", "current_timestamp", "current_user",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false",
    "fetch", "for", "foreign", "from", "grant", "group", "having", "in", "initially",
    "intersect", "into", "lateral", "leading", "limit", "localtime", "localtimestamp", "lock",
    "not", "null", "offset", "on", "only", "or", "order", "placing", "primary", "references",
    "returning", "select", "session_user", "some", "symmetric", "table", "then", "to",
    "trailing", "true", "union", "unique", "user", "using", "variadic", "when", "where",
    "window", "with",
];

fn is_reserved(word: &str) -> bool {
    RESERVED_IDENTIFIERS.contains(&word.to_ascii_lowercase().as_str())
}

/// Name token located by the token walker
#[derive(Debug, Clone)]
struct Target {
    value: String,
    quoted: bool,
    kind: &'static str,
    line: usize,
    column: usize,
}

impl Target {
    fn is_reserved(&self) -> bool {
        !self.quoted && is_reserved(&self.value)
    }

    fn reserved_error(&self) -> SqlError {
        reserved_error(&self.value, self.kind, self.line, self.column)
    }
}

fn reserved_error(token: &str, kind: &str, line: usize, column: usize) -> SqlError {
    SqlError::ParseError {
        token: token.to_string(),
        message: format!("Expected {kind} name but got {token}."),
        line,
        column,
    }
}

/// Two-tier statement classifier
pub struct Classifier {
    dialect: Box<dyn SqlDialect>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Box::new(PostgresDialect::new()))
    }
}

impl Classifier {
    /// Create a classifier for a dialect
    pub fn new(dialect: Box<dyn SqlDialect>) -> Self {
        Self { dialect }
    }

    /// The dialect used for parsing and tokenizing
    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    /// Classify one statement, retrying with the token walker when the
    /// parser does not model the statement.
    pub fn classify(&self, statement: &str) -> SqlResult<ParsedStatement> {
        match self.classify_primary(statement) {
            Err(SqlError::UnsupportedStatement(reason)) => {
                log::debug!("Falling back to token walk ({reason}): {statement}");
                self.classify_fallback(statement)
            }
            result => result,
        }
    }

    /// Parser-based classification.
    ///
    /// Returns `UnsupportedStatement` when the statement should be retried
    /// with [`classify_fallback`](Self::classify_fallback).
    pub fn classify_primary(&self, statement: &str) -> SqlResult<ParsedStatement> {
        let text = statement.trim();
        if text.is_empty() {
            return Err(SqlError::EmptySql);
        }
        let tokens = self.significant_tokens(text)?;
        let target = locate_target(&tokens);

        let parsed = match self.dialect.parse(text) {
            Ok(parsed) => parsed,
            Err(err) => {
                return match target.filter(Target::is_reserved) {
                    Some(t) => Err(t.reserved_error()),
                    None => Err(SqlError::UnsupportedStatement(err.to_string())),
                };
            }
        };
        let Some(ast) = parsed.first() else {
            return Err(SqlError::EmptySql);
        };

        let statement_type = statement_type_of(ast).unwrap_or_else(|| leading_type(&tokens));
        if !statement_type.is_ddl() {
            return Ok(ParsedStatement {
                text: text.to_string(),
                statement_type,
                identifier: None,
            });
        }

        match object_ident(ast, target.as_ref()) {
            Some(ident) => {
                if ident.quote_style.is_none() && is_reserved(&ident.value) {
                    let (line, column) = match &target {
                        Some(t) if ident.span.start.line == 0 => (t.line, t.column),
                        _ => (
                            ident.span.start.line as usize,
                            ident.span.start.column as usize,
                        ),
                    };
                    let kind = target.as_ref().map_or("table", |t| t.kind);
                    return Err(reserved_error(&ident.value, kind, line, column));
                }
                Ok(ParsedStatement {
                    text: text.to_string(),
                    statement_type,
                    identifier: Some(ident.value),
                })
            }
            None => match target.filter(Target::is_reserved) {
                Some(t) => Err(t.reserved_error()),
                None => Err(SqlError::UnsupportedStatement(format!(
                    "no object reference in {statement_type} statement"
                ))),
            },
        }
    }

    /// Token-walk classification
    pub fn classify_fallback(&self, statement: &str) -> SqlResult<ParsedStatement> {
        let text = statement.trim();
        if text.is_empty() {
            return Err(SqlError::EmptySql);
        }
        let tokens = self.significant_tokens(text)?;
        let statement_type = leading_type(&tokens);
        if !statement_type.is_ddl() {
            return Ok(ParsedStatement {
                text: text.to_string(),
                statement_type,
                identifier: None,
            });
        }

        let target = locate_target(&tokens).ok_or_else(|| SqlError::MissingIdentifier {
            statement_type: statement_type.to_string(),
            statement: text.to_string(),
        })?;
        Ok(ParsedStatement {
            text: text.to_string(),
            statement_type,
            identifier: Some(target.value),
        })
    }

    /// Tokens without whitespace and comments
    fn significant_tokens(&self, text: &str) -> SqlResult<Vec<TokenWithSpan>> {
        Ok(self
            .dialect
            .tokenize(text)?
            .into_iter()
            .filter(|t| !matches!(t.token, Token::Whitespace(_)))
            .collect())
    }
}

/// Statement type read off the AST, `None` for variants not listed here
fn statement_type_of(statement: &Statement) -> Option<StatementType> {
    let statement_type = match statement {
        Statement::CreateTable(_)
        | Statement::CreateIndex(_)
        | Statement::CreateView { .. }
        | Statement::CreateSchema { .. } => StatementType::Create,
        Statement::AlterTable { .. } | Statement::AlterIndex { .. } | Statement::AlterView { .. } => {
            StatementType::Alter
        }
        Statement::Drop { .. } => StatementType::Drop,
        Statement::Insert(_) => StatementType::Insert,
        Statement::Update { .. } => StatementType::Update,
        Statement::Delete(_) => StatementType::Delete,
        Statement::Query(_) => StatementType::Other,
        _ => return None,
    };
    Some(statement_type)
}

/// Target object of a DDL statement.
///
/// Variants without a dedicated arm use the first relation in the tree,
/// accepted only when it agrees with the token walker.
fn object_ident(statement: &Statement, target: Option<&Target>) -> Option<Ident> {
    match statement {
        Statement::CreateTable(create) => last_ident(&create.name),
        Statement::CreateIndex(index) => last_ident(&index.table_name),
        Statement::Drop { names, .. } => names.first().and_then(last_ident),
        Statement::CreateSchema { schema_name, .. } => match schema_name {
            SchemaName::Simple(name) | SchemaName::NamedAuthorization(name, _) => {
                last_ident(name)
            }
            SchemaName::UnnamedAuthorization(ident) => Some(ident.clone()),
        },
        _ => first_relation(statement)
            .filter(|ident| target.map_or(true, |t| t.value == ident.value)),
    }
}

fn first_relation(statement: &Statement) -> Option<Ident> {
    let found = visit_relations(statement, |relation| match last_ident(relation) {
        Some(ident) => ControlFlow::Break(ident),
        None => ControlFlow::Continue(()),
    });
    match found {
        ControlFlow::Break(ident) => Some(ident),
        ControlFlow::Continue(()) => None,
    }
}

fn last_ident(name: &ObjectName) -> Option<Ident> {
    name.0.last().and_then(|part| part.as_ident()).cloned()
}

fn word(token: &TokenWithSpan) -> Option<&str> {
    match &token.token {
        Token::Word(w) if w.quote_style.is_none() => Some(w.value.as_str()),
        _ => None,
    }
}

fn is_word(token: Option<&TokenWithSpan>, expected: &str) -> bool {
    token
        .and_then(word)
        .is_some_and(|w| w.eq_ignore_ascii_case(expected))
}

/// Type from the first keyword, looking past a leading WITH clause
fn leading_type(tokens: &[TokenWithSpan]) -> StatementType {
    let Some(first) = tokens.first().and_then(word) else {
        return StatementType::Other;
    };
    if first.eq_ignore_ascii_case("WITH") {
        return tokens
            .iter()
            .filter_map(word)
            .map(StatementType::from_keyword)
            .find(|t| {
                matches!(
                    t,
                    StatementType::Insert | StatementType::Update | StatementType::Delete
                )
            })
            .unwrap_or(StatementType::Other);
    }
    StatementType::from_keyword(first)
}

/// Find the name following the first object keyword.
///
/// Skips `IF [NOT] EXISTS`, `ONLY` and `CONCURRENTLY`; for `CREATE INDEX`
/// the target is the table after `ON`, not the index name. A qualified name
/// yields its last part.
fn locate_target(tokens: &[TokenWithSpan]) -> Option<Target> {
    let (pos, kind) = tokens.iter().enumerate().find_map(|(i, t)| {
        let w = word(t)?;
        OBJECT_KEYWORDS
            .iter()
            .find(|k| w.eq_ignore_ascii_case(k))
            .map(|k| (i, *k))
    })?;

    let mut i = pos + 1;
    loop {
        if is_word(tokens.get(i), "IF") {
            i += if is_word(tokens.get(i + 1), "NOT") { 3 } else { 2 };
        } else if is_word(tokens.get(i), "CONCURRENTLY") || is_word(tokens.get(i), "ONLY") {
            i += 1;
        } else {
            break;
        }
    }

    if kind == "INDEX" && leading_type(tokens) == StatementType::Create {
        i += tokens[i.min(tokens.len())..]
            .iter()
            .position(|t| is_word(Some(t), "ON"))?
            + 1;
        if is_word(tokens.get(i), "ONLY") {
            i += 1;
        }
    }

    while matches!(tokens.get(i + 1).map(|t| &t.token), Some(Token::Period))
        && matches!(tokens.get(i + 2).map(|t| &t.token), Some(Token::Word(_)))
    {
        i += 2;
    }

    let tok = tokens.get(i)?;
    let Token::Word(w) = &tok.token else {
        return None;
    };
    Some(Target {
        value: w.value.clone(),
        quoted: w.quote_style.is_some(),
        kind: object_kind(kind),
        line: tok.span.start.line as usize,
        column: tok.span.start.column as usize,
    })
}

fn object_kind(keyword: &str) -> &'static str {
    match keyword {
        "VIEW" => "view",
        "SCHEMA" => "schema",
        "EXTENSION" => "extension",
        "AGGREGATE" => "aggregate",
        "SEQUENCE" => "sequence",
        "FUNCTION" => "function",
        "TYPE" => "type",
        _ => "table",
    }
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
