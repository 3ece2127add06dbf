use super::*;

fn ids(raw: &[&str]) -> Vec<MigrationId> {
    raw.iter().map(|s| MigrationId::try_new(*s).unwrap()).collect()
}

const FULL: &str = "\
-- add users table
-- depends: 20240101_01_aaaaa-init 20240102_01_bbbbb-roles

-- migrate: apply
CREATE TABLE users (id INT);

-- migrate: rollback
DROP TABLE users;
";

#[test]
fn test_parse_declarative_splits_sections() {
    let src = parse_declarative("users.sql", FULL).unwrap();
    assert_eq!(src.header.message, "add users table");
    assert_eq!(
        src.header.depends,
        ids(&["20240101_01_aaaaa-init", "20240102_01_bbbbb-roles"])
    );
    assert!(src.header.use_transaction);
    assert_eq!(src.apply.trim(), "CREATE TABLE users (id INT);");
    assert_eq!(src.rollback.trim(), "DROP TABLE users;");
}

#[test]
fn test_parse_declarative_empty_message_and_depends() {
    let text = "--\n-- depends:\n\n-- migrate: apply\n\n-- migrate: rollback\n";
    let src = parse_declarative("empty.sql", text).unwrap();
    assert_eq!(src.header.message, "");
    assert!(src.header.depends.is_empty());
    assert!(src.apply.trim().is_empty());
}

#[test]
fn test_parse_declarative_transaction_opt_out() {
    let text = "-- concurrent index\n-- depends:\n-- transaction: false\n\n-- migrate: apply\n\n-- migrate: rollback\n";
    let src = parse_declarative("ix.sql", text).unwrap();
    assert!(!src.header.use_transaction);
}

#[test]
fn test_parse_declarative_accepts_crlf() {
    let text = FULL.replace('\n', "\r\n");
    let src = parse_declarative("users.sql", &text).unwrap();
    assert_eq!(src.header.message, "add users table");
    assert_eq!(src.header.depends.len(), 2);
}

#[test]
fn test_squashed_lines_do_not_disturb_header() {
    let text = "-- merged\n-- depends: a\n\n-- squashed: b\n-- squashed: c\n\n-- migrate: apply\n\n-- migrate: rollback\n";
    let src = parse_declarative("d.sql", text).unwrap();
    assert_eq!(src.header.message, "merged");
    assert_eq!(src.header.depends, ids(&["a"]));
}

#[test]
fn test_missing_apply_marker() {
    let err = parse_declarative("bad.sql", "-- x\n-- depends:\n\n-- migrate: rollback\n").unwrap_err();
    assert!(matches!(err, LoadError::MissingApplyMarker { .. }));
    assert!(err.to_string().contains("bad.sql: No '-- migrate: apply' found."));
}

#[test]
fn test_missing_rollback_marker() {
    let err = parse_declarative("bad.sql", "-- x\n-- depends:\n\n-- migrate: apply\n").unwrap_err();
    assert!(matches!(err, LoadError::MissingRollbackMarker { .. }));
    assert!(err
        .to_string()
        .contains("bad.sql: No '-- migrate: rollback' found."));
}

#[test]
fn test_duplicate_marker() {
    let text = "-- x\n-- depends:\n-- migrate: apply\n-- migrate: apply\n-- migrate: rollback\n";
    let err = parse_declarative("dup.sql", text).unwrap_err();
    assert!(matches!(err, LoadError::DuplicateMarker { count: 2, .. }));
}

#[test]
fn test_markers_out_of_order() {
    let text = "-- x\n-- depends:\n-- migrate: rollback\n-- migrate: apply\n";
    let err = parse_declarative("order.sql", text).unwrap_err();
    assert!(matches!(err, LoadError::MarkersOutOfOrder { .. }));
}

#[test]
fn test_invalid_header() {
    let err = parse_declarative("nohdr.sql", "-- commit\n\n-- migrate: apply\n-- migrate: rollback\n")
        .unwrap_err();
    assert!(matches!(err, LoadError::InvalidHeader { .. }));
    assert!(err
        .to_string()
        .contains("nohdr.sql: No '-- depends:' or message found."));
}

#[test]
fn test_parse_script_header() {
    let text = "//! seed reference data\n//!\n//! depends: a b\n//! transaction: false\n\nuse foo;\n//! depends: ignored\n";
    let header = parse_script_header("seed.rs", text).unwrap();
    assert_eq!(header.message, "seed reference data");
    assert_eq!(header.depends, ids(&["a", "b"]));
    assert!(!header.use_transaction);
}

#[test]
fn test_parse_script_header_requires_depends() {
    let err = parse_script_header("seed.rs", "//! no metadata here\nfn main() {}\n").unwrap_err();
    assert!(matches!(err, LoadError::InvalidScriptHeader { .. }));
}

#[test]
fn test_rewrite_depends_replaces_removed_id() {
    let out = rewrite_depends(FULL, "20240102_01_bbbbb-roles", &ids(&["x", "20240101_01_aaaaa-init"]))
        .unwrap();
    assert!(out.contains("-- depends: 20240101_01_aaaaa-init x\n"));
    assert!(out.contains("CREATE TABLE users (id INT);"));
}

#[test]
fn test_rewrite_depends_to_empty() {
    let text = "-- b\n-- depends: a\n\n-- migrate: apply\n\n-- migrate: rollback\n";
    let out = rewrite_depends(text, "a", &[]).unwrap();
    assert!(out.starts_with("-- b\n-- depends:\n"));
}

#[test]
fn test_rewrite_depends_script_header() {
    let text = "//! seed\n//! depends: a\n";
    let out = rewrite_depends(text, "a", &ids(&["z"])).unwrap();
    assert_eq!(out, "//! seed\n//! depends: z\n");
}

#[test]
fn test_rewrite_depends_ignores_unrelated_file() {
    assert!(rewrite_depends(FULL, "not-there", &[]).is_none());
}

#[test]
fn test_template_parses_back() {
    let deps = ids(&["prev"]);
    let sql = declarative_template("new table", &deps);
    let src = parse_declarative("new.sql", &sql).unwrap();
    assert_eq!(src.header.message, "new table");
    assert_eq!(src.header.depends, deps);
}
