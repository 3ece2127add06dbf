//! sl-sql - SQL layer for Sluice
//!
//! This crate splits migration sections into statements and classifies each
//! statement by type and target object, using sqlparser-rs with a token-walk
//! fallback for constructs the parser does not model.

pub mod classifier;
pub mod dialect;
pub mod error;
pub mod splitter;

pub use classifier::{Classifier, ParsedStatement, StatementType};
pub use dialect::{dialect_from_name, DuckDbDialect, PostgresDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use splitter::split_statements;
