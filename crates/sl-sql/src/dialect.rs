//! SQL dialect abstraction

use sqlparser::ast::Statement;
use sqlparser::dialect::{
    Dialect, DuckDbDialect as SqlParserDuckDb, PostgreSqlDialect as SqlParserPostgres,
};
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{TokenWithSpan, Tokenizer};

use crate::error::{SqlError, SqlResult};

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Parse SQL into AST statements
    fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        Parser::parse_sql(self.parser_dialect(), sql).map_err(|e| {
            let message = e.to_string();
            let (line, column) = parse_location_from_error(&message);
            SqlError::ParseError {
                token: String::new(),
                message,
                line,
                column,
            }
        })
    }

    /// Tokenize SQL, keeping whitespace and comments with their positions
    fn tokenize(&self, sql: &str) -> SqlResult<Vec<TokenWithSpan>> {
        Tokenizer::new(self.parser_dialect(), sql)
            .tokenize_with_location()
            .map_err(|e| SqlError::TokenizeError {
                message: e.message.clone(),
                line: e.location.line as usize,
                column: e.location.column as usize,
            })
    }

    /// Get the dialect name
    fn name(&self) -> &'static str;
}

/// Parse line and column from a sqlparser error message.
///
/// `ParserError` is a plain string wrapper, so the position has to be read
/// back out of "... at Line: N, Column: M".
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let number_after = |label: &str| -> Option<usize> {
        let start = msg.find(label)? + label.len();
        let digits: String = msg[start..]
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    };
    match (number_after("Line:"), number_after("Column:")) {
        (Some(line), Some(column)) => (line, column),
        _ => (0, 0),
    }
}

/// PostgreSQL dialect
pub struct PostgresDialect {
    dialect: SqlParserPostgres,
}

impl PostgresDialect {
    /// Create a new PostgreSQL dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserPostgres {},
        }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for PostgresDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// DuckDB dialect
pub struct DuckDbDialect {
    dialect: SqlParserDuckDb,
}

impl DuckDbDialect {
    /// Create a new DuckDB dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserDuckDb {},
        }
    }
}

impl Default for DuckDbDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for DuckDbDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "duckdb"
    }
}

/// Look a dialect up by its configuration name
pub fn dialect_from_name(name: &str) -> SqlResult<Box<dyn SqlDialect>> {
    match name.to_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(Box::new(PostgresDialect::new())),
        "duckdb" => Ok(Box::new(DuckDbDialect::new())),
        _ => Err(SqlError::UnknownDialect(name.to_string())),
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
