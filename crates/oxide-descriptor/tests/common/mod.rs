#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use oxide_descriptor::ast::{BinaryOperator, Node, NodeId, WhereExpression};
use oxide_descriptor::storage::{
    AddStatement, AggregateFunction, Assign, Execute, Filter, QueryStatement, RemoveStatement,
    ReplaceStatement, UpdateStatement,
};
use oxide_descriptor::validate::validate;
use oxide_descriptor::{
    parse_descriptor, BackingStorage, Category, Cursor, DescriptorParseError, Expression, Key,
    ParsedStatement, SortDirection, Statement, StatementAst, StatementDescriptor, StorageError,
    Value,
};

// ============================================================================
// Categories
// ============================================================================

pub fn vm_info() -> Arc<Category> {
    Arc::new(Category::new(
        "vm-info",
        ["vm-id", "start-time", "owner"].into_iter().map(Key::new),
    ))
}

pub fn cat() -> Arc<Category> {
    Arc::new(Category::new("cat", ["k1", "k2"].into_iter().map(Key::new)))
}

pub fn descriptor(category: &Arc<Category>, text: &str) -> StatementDescriptor {
    StatementDescriptor::new(Arc::clone(category), text)
}

// ============================================================================
// Parsing helpers
// ============================================================================

/// Parses and validates `text`, panicking on failure.
pub fn parse(category: &Category, text: &str) -> StatementAst {
    let ast = parse_descriptor(text, category)
        .unwrap_or_else(|e| panic!("Failed to parse: {text}\nError: {e:?}"));
    validate(&ast, category).unwrap_or_else(|e| panic!("Failed to validate: {text}\nError: {e:?}"));
    ast
}

/// Parses and validates `text`, expecting an error.
pub fn parse_err(category: &Category, text: &str) -> DescriptorParseError {
    match parse_descriptor(text, category) {
        Ok(ast) => validate(&ast, category)
            .expect_err(&format!("Expected descriptor error for: {text}")),
        Err(e) => e,
    }
}

/// Verifies that `to_string()` produces a fixed point:
/// parse(text).to_string() can be re-parsed and yields the same
/// string again.
pub fn round_trip(category: &Category, text: &str) {
    let rendered1 = parse(category, text).to_string();
    let rendered2 = parse(category, &rendered1).to_string();
    assert_eq!(
        rendered1, rendered2,
        "Round-trip failed.\n  Input:    {text}\n  First:    {rendered1}\n  Second:   {rendered2}"
    );
}

/// Renders the shape of a WHERE tree, e.g. `OR(AND(a=?s, b=?s), c=?s)`.
pub fn shape(expr: &WhereExpression) -> String {
    fn node(expr: &WhereExpression, id: NodeId) -> String {
        match expr.node(id) {
            Node::Binary {
                op,
                left: Some(l),
                right: Some(r),
            } => match op {
                BinaryOperator::Logical(op) => {
                    format!("{op}({}, {})", node(expr, *l), node(expr, *r))
                }
                BinaryOperator::Comparison(op) => {
                    format!("{}{op}{}", node(expr, *l), node(expr, *r))
                }
            },
            Node::Not { child: Some(c) } => format!("NOT({})", node(expr, *c)),
            Node::Terminal(t) => t.to_string(),
            other => panic!("Incomplete node {other:?}"),
        }
    }
    node(expr, expr.root().expect("WHERE expression has a root"))
}

pub fn where_shape(category: &Category, text: &str) -> String {
    let ast = parse(category, text);
    shape(ast.suffix.where_expn.as_ref().expect("WHERE clause"))
}

// ============================================================================
// Recording backing store
// ============================================================================

/// A call made on a fake statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Set(String, Value),
    Where(Expression),
    Sort(Key, SortDirection),
    Limit(i32),
}

/// An executed statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub id: usize,
    pub kind: String,
    pub ops: Vec<Op>,
}

#[derive(Debug, Default)]
pub struct Log {
    next_id: usize,
    /// Statements created by the storage factory, i.e. templates.
    pub created: Vec<(usize, String)>,
    /// Statements that received at least one call.
    pub mutated: BTreeSet<usize>,
    pub executed: Vec<Executed>,
    pub fail: bool,
}

impl Log {
    fn allocate(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// A backing store that records every call.
#[derive(Debug, Clone, Default)]
pub struct FakeStorage {
    log: Arc<Mutex<Log>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose statements fail on execution.
    pub fn failing() -> Self {
        let storage = Self::default();
        storage.log.lock().unwrap().fail = true;
        storage
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.log.lock().unwrap().executed.clone()
    }

    pub fn last_executed(&self) -> Executed {
        self.executed().pop().expect("a statement was executed")
    }

    pub fn created(&self) -> Vec<(usize, String)> {
        self.log.lock().unwrap().created.clone()
    }

    pub fn mutated(&self) -> BTreeSet<usize> {
        self.log.lock().unwrap().mutated.clone()
    }

    fn create(&self, kind: String) -> FakeStatement {
        let mut log = self.log.lock().unwrap();
        let id = log.allocate();
        log.created.push((id, kind.clone()));
        FakeStatement {
            id,
            kind,
            ops: Vec::new(),
            log: Arc::clone(&self.log),
        }
    }
}

impl BackingStorage for FakeStorage {
    fn create_query(&self, category: &Category) -> Box<dyn QueryStatement> {
        Box::new(self.create(format!("QUERY {}", category.name())))
    }

    fn create_aggregate_query(
        &self,
        function: AggregateFunction,
        category: &Category,
        key: Option<Key>,
    ) -> Box<dyn QueryStatement> {
        let kind = match key {
            Some(key) => format!("{function}({key}) {}", category.name()),
            None => format!("{function} {}", category.name()),
        };
        Box::new(self.create(kind))
    }

    fn create_add(&self, category: &Category) -> Box<dyn AddStatement> {
        Box::new(self.create(format!("ADD {}", category.name())))
    }

    fn create_replace(&self, category: &Category) -> Box<dyn ReplaceStatement> {
        Box::new(self.create(format!("REPLACE {}", category.name())))
    }

    fn create_update(&self, category: &Category) -> Box<dyn UpdateStatement> {
        Box::new(self.create(format!("UPDATE {}", category.name())))
    }

    fn create_remove(&self, category: &Category) -> Box<dyn RemoveStatement> {
        Box::new(self.create(format!("REMOVE {}", category.name())))
    }
}

#[derive(Debug)]
pub struct FakeStatement {
    id: usize,
    kind: String,
    ops: Vec<Op>,
    log: Arc<Mutex<Log>>,
}

impl FakeStatement {
    fn duplicate(&self) -> Self {
        let id = self.log.lock().unwrap().allocate();
        Self {
            id,
            kind: self.kind.clone(),
            ops: Vec::new(),
            log: Arc::clone(&self.log),
        }
    }

    fn record(&mut self, op: Op) {
        self.log.lock().unwrap().mutated.insert(self.id);
        self.ops.push(op);
    }

    fn finish(&self) -> Result<(), StorageError> {
        let mut log = self.log.lock().unwrap();
        if log.fail {
            return Err(StorageError::Backend(String::from("disk full")));
        }
        log.executed.push(Executed {
            id: self.id,
            kind: self.kind.clone(),
            ops: self.ops.clone(),
        });
        Ok(())
    }
}

impl Filter for FakeStatement {
    fn where_clause(&mut self, expression: Expression) {
        self.record(Op::Where(expression));
    }
}

impl Assign for FakeStatement {
    fn set(&mut self, key: &str, value: Value) {
        self.record(Op::Set(key.to_string(), value));
    }
}

impl Execute for FakeStatement {
    fn execute(&self) -> Result<u64, StorageError> {
        self.finish()?;
        Ok(1)
    }
}

impl QueryStatement for FakeStatement {
    fn sort(&mut self, key: Key, direction: SortDirection) {
        self.record(Op::Sort(key, direction));
    }

    fn limit(&mut self, limit: i32) {
        self.record(Op::Limit(limit));
    }

    fn execute_query(&self) -> Result<Cursor, StorageError> {
        self.finish()?;
        let document = serde_json::json!({ "id": self.id, "kind": self.kind });
        Ok(Box::new(std::iter::once(Ok(document))))
    }

    fn raw_duplicate(&self) -> Box<dyn QueryStatement> {
        Box::new(self.duplicate())
    }
}

impl AddStatement for FakeStatement {
    fn raw_duplicate(&self) -> Box<dyn AddStatement> {
        Box::new(self.duplicate())
    }
}

impl ReplaceStatement for FakeStatement {
    fn raw_duplicate(&self) -> Box<dyn ReplaceStatement> {
        Box::new(self.duplicate())
    }
}

impl UpdateStatement for FakeStatement {
    fn raw_duplicate(&self) -> Box<dyn UpdateStatement> {
        Box::new(self.duplicate())
    }
}

impl RemoveStatement for FakeStatement {
    fn raw_duplicate(&self) -> Box<dyn RemoveStatement> {
        Box::new(self.duplicate())
    }
}

/// Parses `text` against `category` with `storage`.
pub fn parsed(storage: &FakeStorage, category: &Arc<Category>, text: &str) -> ParsedStatement {
    ParsedStatement::parse(storage, &descriptor(category, text))
        .unwrap_or_else(|e| panic!("Failed to parse: {text}\nError: {e:?}"))
}

/// Executes a bound statement against the fake store.
pub fn run(statement: Statement) {
    match statement {
        Statement::Query(query) => {
            let _ = query.execute_query().expect("query executes");
        }
        Statement::Write(write) => {
            write.execute().expect("write executes");
        }
    }
}

/// Installs a test log writer. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
