//! Tests for per-kind semantic rules.

mod common;
use common::*;

use oxide_descriptor::{ParsedStatement, StatementExecutionError, StatementCache};

fn message(text: &str) -> String {
    parse_err(&cat(), text).to_string()
}

// ============================================================================
// ADD
// ============================================================================

#[test]
fn add_requires_full_key_set() {
    assert_eq!(
        message("ADD cat SET k1=?s"),
        "Keys don't match keys in category. Expected the following keys: [k1, k2] got [k1]"
    );
    assert_eq!(
        message("ADD cat SET k2 = 1 , k1 = 2 , k3 = 3"),
        "Keys don't match keys in category. Expected the following keys: [k1, k2] got [k1, k2, k3]"
    );
}

#[test]
fn add_forbids_where() {
    assert_eq!(
        message("ADD cat SET k1 = 1 , k2 = 2 WHERE k1 = 1"),
        "WHERE clause not allowed for ADD"
    );
}

#[test]
fn add_requires_set() {
    assert_eq!(message("ADD cat"), "SET list required for ADD");
}

// ============================================================================
// REPLACE
// ============================================================================

#[test]
fn replace_requires_where() {
    assert_eq!(
        message("REPLACE cat SET k1 = ?s , k2 = ?s"),
        "WHERE clause required for REPLACE"
    );
}

#[test]
fn replace_requires_full_key_set() {
    assert_eq!(
        message("REPLACE cat SET k2 = ?s WHERE k1 = ?s"),
        "Keys don't match keys in category. Expected the following keys: [k1, k2] got [k2]"
    );
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn update_names_unknown_keys() {
    let err = message("UPDATE cat SET bogus=?s WHERE k1=?s");
    assert_eq!(err, "Unknown key(s) in SET: 'bogus'");
}

#[test]
fn update_collects_all_unknown_keys() {
    assert_eq!(
        message("UPDATE cat SET x = 1 , k1 = 2 , y = 3 WHERE k1 = 1"),
        "Unknown key(s) in SET: 'x, y'"
    );
}

#[test]
fn update_requires_set_and_where() {
    assert_eq!(message("UPDATE cat WHERE k1 = 1"), "SET list required for UPDATE");
    assert_eq!(message("UPDATE cat SET k1 = 1"), "WHERE clause required for UPDATE");
}

#[test]
fn set_key_must_not_be_free_variable() {
    assert_eq!(
        message("UPDATE cat SET ?s = 1 WHERE k1 = 1"),
        "LHS of set list pair must not be a free variable."
    );
    assert_eq!(
        message("ADD cat SET ?s = 1 , k2 = 2"),
        "LHS of set list pair must not be a free variable."
    );
}

#[test]
fn update_partial_set_is_fine() {
    let ast = parse(&cat(), "UPDATE cat SET k2 = ?b WHERE k1 = ?s");
    assert_eq!(ast.parameter_count, 2);
}

// ============================================================================
// REMOVE
// ============================================================================

#[test]
fn remove_forbids_set() {
    assert_eq!(
        message("REMOVE cat SET k=?s WHERE k=?s"),
        "SET not allowed for REMOVE"
    );
}

#[test]
fn remove_where_is_optional() {
    parse(&cat(), "REMOVE cat");
    parse(&cat(), "REMOVE cat WHERE k1 = ?s");
}

// ============================================================================
// Writes never sort or limit
// ============================================================================

#[test]
fn writes_forbid_sort_and_limit() {
    for (text, expected) in [
        ("REMOVE cat WHERE k1 = 1 SORT k1 ASC", "SORT not allowed for REMOVE"),
        ("REMOVE cat LIMIT 1", "LIMIT not allowed for REMOVE"),
        ("UPDATE cat SET k1 = 1 WHERE k2 = 2 SORT k1 DSC", "SORT not allowed for UPDATE"),
        (
            "REPLACE cat SET k1 = 1 , k2 = 2 WHERE k1 = 1 LIMIT ?i",
            "LIMIT not allowed for REPLACE",
        ),
        ("ADD cat SET k1 = 1 , k2 = 2 LIMIT 4", "LIMIT not allowed for ADD"),
    ] {
        assert_eq!(message(text), expected, "descriptor: {text}");
    }
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn queries_forbid_set() {
    assert_eq!(message("QUERY cat SET k1 = 1"), "SET not allowed for QUERY");
    assert_eq!(
        message("QUERY-COUNT cat SET k1 = 1"),
        "SET not allowed for QUERY-COUNT"
    );
}

#[test]
fn aggregate_keys() {
    parse(&cat(), "QUERY-COUNT cat");
    parse(&cat(), "QUERY-COUNT(k1) cat WHERE k2 = ?s");
    parse(&cat(), "QUERY-DISTINCT(k2) cat");

    assert_eq!(
        message("QUERY-COUNT(k9) cat"),
        "Unknown aggregate key 'k9' for QUERY-COUNT in category 'cat'"
    );
    assert_eq!(
        message("QUERY-DISTINCT cat"),
        "Aggregate key required for QUERY-DISTINCT"
    );
    assert_eq!(
        message("QUERY-DISTINCT(k9) cat"),
        "Unknown aggregate key 'k9' for QUERY-DISTINCT in category 'cat'"
    );
}

// ============================================================================
// Surfaces
// ============================================================================

#[test]
fn parsed_statement_rejects_without_creating_template() {
    let storage = FakeStorage::new();
    let err = ParsedStatement::parse(&storage, &descriptor(&cat(), "ADD cat SET k1=?s"))
        .unwrap_err();
    assert!(err.message.starts_with("Keys don't match keys in category."));
    assert!(storage.created().is_empty());
}

#[test]
fn cache_wraps_descriptor_errors() {
    let storage = FakeStorage::new();
    let cache = StatementCache::new();
    let err = cache
        .prepare(&storage, &descriptor(&cat(), "REMOVE cat SET k1 = 1"))
        .unwrap_err();
    assert!(matches!(err, StatementExecutionError::Descriptor(_)));
    assert_eq!(
        err.to_string(),
        "Descriptor parsing failed: SET not allowed for REMOVE"
    );
    assert!(cache.is_empty());
}
