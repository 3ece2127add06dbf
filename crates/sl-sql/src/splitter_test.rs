use super::*;
use crate::dialect::{DuckDbDialect, PostgresDialect};

fn split(sql: &str) -> Vec<String> {
    split_statements(&PostgresDialect::new(), sql).unwrap()
}

#[test]
fn test_splits_on_semicolons() {
    assert_eq!(
        split("CREATE TABLE one (id INT);\nINSERT INTO one VALUES (1);\n"),
        vec!["CREATE TABLE one (id INT);", "INSERT INTO one VALUES (1);"]
    );
}

#[test]
fn test_empty_and_comment_only_sections() {
    assert!(split("").is_empty());
    assert!(split("\n\n  -- nothing here\n/* or here */\n").is_empty());
    assert!(split(";;").is_empty());
}

#[test]
fn test_leading_comments_are_dropped() {
    assert_eq!(
        split("-- Squash one statements.\n\nDROP TABLE one;\n"),
        vec!["DROP TABLE one;"]
    );
}

#[test]
fn test_inner_comments_are_kept() {
    assert_eq!(
        split("SELECT 1 -- one\n  + 2;"),
        vec!["SELECT 1 -- one\n  + 2;"]
    );
}

#[test]
fn test_semicolons_inside_literals_do_not_split() {
    let sql = "INSERT INTO t VALUES ('a;b');\nCREATE TABLE \"x;y\" (id INT);";
    assert_eq!(
        split(sql),
        vec!["INSERT INTO t VALUES ('a;b');", "CREATE TABLE \"x;y\" (id INT);"]
    );
}

#[test]
fn test_dollar_quoted_body_stays_whole() {
    let sql = "CREATE FUNCTION f() RETURNS int AS $$ SELECT 1; $$ LANGUAGE sql;\nSELECT f();";
    let stmts = split(sql);
    assert_eq!(stmts.len(), 2);
    assert!(stmts[0].contains("SELECT 1; $$"));
}

#[test]
fn test_last_statement_gets_terminated() {
    assert_eq!(
        split("DROP TABLE a;\nDROP TABLE b\n"),
        vec!["DROP TABLE a;", "DROP TABLE b;"]
    );
}

#[test]
fn test_trailing_comment_does_not_swallow_terminator() {
    assert_eq!(split("DROP TABLE b -- bye\n"), vec!["DROP TABLE b;"]);
}

#[test]
fn test_non_ascii_text_is_sliced_on_char_boundaries() {
    assert_eq!(
        split("INSERT INTO t VALUES ('héllo');\nINSERT INTO t VALUES ('ø');"),
        vec!["INSERT INTO t VALUES ('héllo');", "INSERT INTO t VALUES ('ø');"]
    );
}

#[test]
fn test_duckdb_dialect() {
    let stmts = split_statements(&DuckDbDialect::new(), "SELECT 1; SELECT 2").unwrap();
    assert_eq!(stmts, vec!["SELECT 1;", "SELECT 2;"]);
}

#[test]
fn test_ensure_terminated() {
    let mut stmts = vec!["SELECT 1;".to_string(), "SELECT 2  ".to_string()];
    ensure_terminated(&mut stmts);
    assert_eq!(stmts[1], "SELECT 2;");
    ensure_terminated(&mut stmts);
    assert_eq!(stmts[1], "SELECT 2;");
}
