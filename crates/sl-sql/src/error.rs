//! Error types for sl-sql

use thiserror::Error;

/// SQL parsing and classification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// SQL parse error (S001)
    #[error("[S001] {message} (line {line}, column {column})")]
    ParseError {
        /// Offending token, empty when the parser did not name one
        token: String,
        message: String,
        line: usize,
        column: usize,
    },

    /// Empty SQL (S002)
    #[error("[S002] SQL is empty")]
    EmptySql,

    /// Statement shape not modeled by the primary parser (S003)
    #[error("[S003] Unsupported SQL statement: {0}")]
    UnsupportedStatement(String),

    /// DDL statement without a target object (S004)
    #[error("[S004] {statement_type} statement has no target identifier: {statement}")]
    MissingIdentifier {
        statement_type: String,
        statement: String,
    },

    /// Tokenizer failure (S005)
    #[error("[S005] Failed to tokenize SQL at line {line}, column {column}: {message}")]
    TokenizeError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Unknown dialect name (S006)
    #[error("[S006] Unknown SQL dialect: {0}")]
    UnknownDialect(String),
}

impl SqlError {
    /// Whether the classifier should retry this statement with the token walker
    pub fn is_unmodeled(&self) -> bool {
        matches!(self, SqlError::UnsupportedStatement(_))
    }
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
