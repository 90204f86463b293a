//! Tests for binding parameters into parsed statements.

mod common;
use common::*;

use serde::Serialize;

use oxide_descriptor::storage::{ComparisonOperator, LogicalOperator};
use oxide_descriptor::{
    BindingError, Expression, Key, Pojo, PreparedParameters, SortDirection, Statement, Value,
};

fn params(values: Vec<Value>) -> PreparedParameters {
    let mut params = PreparedParameters::new(values.len());
    for (i, value) in values.into_iter().enumerate() {
        params.set(i, value).unwrap();
    }
    params
}

fn s(text: &str) -> Value {
    Value::String(String::from(text))
}

fn eq(key: &str, value: Value) -> Expression {
    Expression::compare(Key::new(key), ComparisonOperator::Equal, value)
}

#[derive(Serialize)]
struct AgentInfo {
    agent_id: String,
    alive: bool,
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn patch_query_with_where_sort_limit() {
    init_tracing();
    let storage = FakeStorage::new();
    let parsed = parsed(
        &storage,
        &vm_info(),
        "QUERY vm-info WHERE vm-id = ?s SORT start-time DSC LIMIT ?i",
    );
    assert_eq!(parsed.parameter_count(), 2);

    run(parsed.patch(&params(vec![s("vm123"), Value::Int(10)])).unwrap());

    let executed = storage.last_executed();
    assert_eq!(executed.kind, "QUERY vm-info");
    assert_eq!(
        executed.ops,
        vec![
            Op::Where(eq("vm-id", s("vm123"))),
            Op::Sort(Key::new("start-time"), SortDirection::Descending),
            Op::Limit(10),
        ]
    );
}

#[test]
fn patch_builds_logical_tree() {
    let storage = FakeStorage::new();
    let parsed = parsed(
        &storage,
        &vm_info(),
        "QUERY vm-info WHERE NOT a = ?s AND b > ?l OR c = true",
    );
    run(parsed.patch(&params(vec![s("x"), Value::Long(7)])).unwrap());

    let expected = Expression::Logical {
        left: Box::new(Expression::Logical {
            left: Box::new(eq("a", s("x")).not()),
            op: LogicalOperator::And,
            right: Box::new(Expression::compare(
                Key::new("b"),
                ComparisonOperator::Greater,
                Value::Long(7),
            )),
        }),
        op: LogicalOperator::Or,
        right: Box::new(eq("c", Value::Boolean(true))),
    };
    assert_eq!(storage.last_executed().ops, vec![Op::Where(expected)]);
}

#[test]
fn patch_sort_key_from_parameter() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &vm_info(), "QUERY vm-info SORT ?s ASC , owner DSC");
    run(parsed.patch(&params(vec![s("start-time")])).unwrap());
    assert_eq!(
        storage.last_executed().ops,
        vec![
            Op::Sort(Key::new("start-time"), SortDirection::Ascending),
            Op::Sort(Key::new("owner"), SortDirection::Descending),
        ]
    );
}

#[test]
fn patch_where_key_from_parameter() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &vm_info(), "QUERY vm-info WHERE ?s = ?i");
    run(parsed.patch(&params(vec![s("owner"), Value::Int(3)])).unwrap());
    assert_eq!(
        storage.last_executed().ops,
        vec![Op::Where(eq("owner", Value::Int(3)))]
    );
}

#[test]
fn patch_aggregate_query() {
    let storage = FakeStorage::new();
    let parsed = parsed(
        &storage,
        &vm_info(),
        "QUERY-DISTINCT(owner) vm-info WHERE start-time >= 5L",
    );
    run(parsed.patch(&PreparedParameters::new(0)).unwrap());
    let executed = storage.last_executed();
    assert_eq!(executed.kind, "QUERY-DISTINCT(owner) vm-info");
    assert_eq!(
        executed.ops,
        vec![Op::Where(Expression::compare(
            Key::new("start-time"),
            ComparisonOperator::GreaterEqual,
            Value::Long(5),
        ))]
    );
}

// ============================================================================
// Writes
// ============================================================================

#[test]
fn patch_update_applies_set_before_where() {
    let storage = FakeStorage::new();
    let parsed = parsed(
        &storage,
        &vm_info(),
        "UPDATE vm-info SET owner = ?s , start-time = 99L WHERE vm-id = ?s",
    );
    run(parsed.patch(&params(vec![s("alice"), s("vm1")])).unwrap());
    assert_eq!(
        storage.last_executed().ops,
        vec![
            Op::Set(String::from("owner"), s("alice")),
            Op::Set(String::from("start-time"), Value::Long(99)),
            Op::Where(eq("vm-id", s("vm1"))),
        ]
    );
}

#[test]
fn patch_add_with_lists_and_pojos() {
    let storage = FakeStorage::new();
    let parsed = parsed(
        &storage,
        &vm_info(),
        "ADD vm-info SET vm-id = ?s[ , start-time = ?d , owner = ?p",
    );
    let agent = Pojo::new(&AgentInfo {
        agent_id: String::from("a-1"),
        alive: true,
    })
    .unwrap();
    let bound = params(vec![
        Value::StringList(vec![String::from("x"), String::from("y")]),
        Value::Double(0.5),
        Value::Pojo(agent.clone()),
    ]);
    run(parsed.patch(&bound).unwrap());

    let executed = storage.last_executed();
    assert_eq!(executed.kind, "ADD vm-info");
    assert_eq!(
        executed.ops,
        vec![
            Op::Set(
                String::from("vm-id"),
                Value::StringList(vec![String::from("x"), String::from("y")])
            ),
            Op::Set(String::from("start-time"), Value::Double(0.5)),
            Op::Set(String::from("owner"), Value::Pojo(agent)),
        ]
    );
}

#[test]
fn patch_remove_without_where() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &vm_info(), "REMOVE vm-info");
    let statement = parsed.patch(&PreparedParameters::new(0)).unwrap();
    assert!(matches!(statement, Statement::Write(_)));
    run(statement);
    assert!(storage.last_executed().ops.is_empty());
}

// ============================================================================
// Type checks
// ============================================================================

#[test]
fn string_into_int_placeholder_fails() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &vm_info(), "QUERY vm-info LIMIT ?i");
    let err = parsed.patch(&params(vec![s("10")])).unwrap_err();
    assert!(matches!(
        err,
        BindingError::TypeMismatch { index: 0, ref expected, ref actual }
            if expected == "?i" && actual == "?s"
    ));
    assert_eq!(
        err.to_string(),
        "Expected parameter 0 of type ?i but got ?s"
    );
}

#[test]
fn scalar_and_list_do_not_mix() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &cat(), "ADD cat SET k1 = ?l[ , k2 = ?l");
    let err = parsed
        .patch(&params(vec![Value::Long(1), Value::Long(2)]))
        .unwrap_err();
    assert!(matches!(err, BindingError::TypeMismatch { index: 0, .. }));

    let err = parsed
        .patch(&params(vec![Value::LongList(vec![1]), Value::LongList(vec![2])]))
        .unwrap_err();
    assert!(matches!(err, BindingError::TypeMismatch { index: 1, .. }));

    parsed
        .patch(&params(vec![Value::LongList(vec![1]), Value::Long(2)]))
        .unwrap();
}

#[test]
fn int_and_long_are_distinct() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &cat(), "QUERY cat WHERE k1 = ?l");
    let err = parsed.patch(&params(vec![Value::Int(1)])).unwrap_err();
    assert!(matches!(err, BindingError::TypeMismatch { .. }));
}

#[test]
fn pojo_placeholder_accepts_any_pojo_type() {
    #[derive(Serialize)]
    struct Other {
        n: i32,
    }

    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &cat(), "ADD cat SET k1 = ?p , k2 = ?p[");
    let agent = Pojo::new(&AgentInfo {
        agent_id: String::from("a"),
        alive: false,
    })
    .unwrap();
    let other = Pojo::new(&Other { n: 1 }).unwrap();

    parsed
        .patch(&params(vec![
            Value::Pojo(other.clone()),
            Value::PojoList(vec![agent.clone(), other.clone()]),
        ]))
        .unwrap();

    let err = parsed
        .patch(&params(vec![
            Value::PojoList(vec![agent]),
            Value::PojoList(vec![other]),
        ]))
        .unwrap_err();
    assert!(matches!(err, BindingError::TypeMismatch { index: 0, .. }));

    let err = parsed
        .patch(&params(vec![s("not a pojo"), Value::PojoList(vec![])]))
        .unwrap_err();
    assert!(matches!(err, BindingError::TypeMismatch { index: 0, .. }));
}

#[test]
fn unbound_parameter_fails() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &cat(), "QUERY cat WHERE k1 = ?s AND k2 = ?s");
    let mut partial = PreparedParameters::new(2);
    partial.set(0, s("a")).unwrap();
    let err = parsed.patch(&partial).unwrap_err();
    assert!(matches!(err, BindingError::UnboundParameter { index: 1 }));
}

#[test]
fn too_few_parameters_fail() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &cat(), "QUERY cat WHERE k1 = ?s AND k2 = ?s");
    let err = parsed.patch(&params(vec![s("a")])).unwrap_err();
    assert!(matches!(
        err,
        BindingError::IndexOutOfRange { index: 1, count: 1 }
    ));
}

#[test]
fn non_string_where_key_fails() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &cat(), "QUERY cat WHERE ?i = 1");
    let err = parsed.patch(&params(vec![Value::Int(4)])).unwrap_err();
    assert!(matches!(err, BindingError::InvalidTerm(_)));
}

#[test]
fn failed_binding_does_not_touch_store() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &cat(), "UPDATE cat SET k1 = ?s WHERE k2 = ?i");
    let _ = parsed.patch(&params(vec![s("ok"), s("bad")])).unwrap_err();
    assert!(storage.mutated().is_empty());
    assert!(storage.executed().is_empty());
}

// ============================================================================
// Duplicate before mutate
// ============================================================================

#[test]
fn template_is_never_mutated() {
    let storage = FakeStorage::new();
    let parsed = parsed(&storage, &cat(), "UPDATE cat SET k1 = ?s WHERE k2 = ?i");
    let created = storage.created();
    assert_eq!(created.len(), 1);
    let template_id = created[0].0;

    run(parsed.patch(&params(vec![s("a"), Value::Int(1)])).unwrap());
    run(parsed.patch(&params(vec![s("b"), Value::Int(2)])).unwrap());

    assert!(!storage.mutated().contains(&template_id));
    let executed = storage.executed();
    assert_eq!(executed.len(), 2);
    assert_ne!(executed[0].id, template_id);
    assert_ne!(executed[1].id, template_id);
    assert_ne!(executed[0].id, executed[1].id);
}

#[test]
fn no_state_leaks_between_executions() {
    let storage = FakeStorage::new();
    let parsed = parsed(
        &storage,
        &vm_info(),
        "QUERY vm-info WHERE vm-id = ?s SORT start-time DSC LIMIT ?i",
    );
    run(parsed.patch(&params(vec![s("first"), Value::Int(1)])).unwrap());
    run(parsed.patch(&params(vec![s("second"), Value::Int(2)])).unwrap());

    let executed = storage.executed();
    assert_eq!(
        executed[1].ops,
        vec![
            Op::Where(eq("vm-id", s("second"))),
            Op::Sort(Key::new("start-time"), SortDirection::Descending),
            Op::Limit(2),
        ]
    );
}
