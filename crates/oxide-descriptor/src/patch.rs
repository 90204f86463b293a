//! Binding free parameters into parsed statements.
//!
//! Patching walks the AST of a [`ParsedStatement`] with a set of bound
//! values and produces backing store expressions, sort keys, a limit and SET
//! assignments. These are applied to a duplicate of the statement template,
//! never to the template itself.

use tracing::trace;

use crate::ast::{
    BinaryOperator, LimitExpression, Node, NodeId, SetList, SortExpression, Terminal,
    TerminalValue, WhereExpression,
};
use crate::error::BindingError;
use crate::parsed::ParsedStatement;
use crate::prepared::PreparedParameters;
use crate::storage::{Expression, Key, SortDirection, Statement, WriteStatement};
use crate::value::Value;

/// The result of patching a single node.
#[derive(Debug, Clone, PartialEq)]
enum Patched {
    Key(Key),
    Value(Value),
    Expression(Expression),
}

impl Patched {
    fn into_key(self, context: &str) -> Result<Key, BindingError> {
        match self {
            Self::Key(key) => Ok(key),
            other => Err(BindingError::InvalidTerm(format!(
                "{context} requires a key, got {}",
                other.describe()
            ))),
        }
    }

    fn into_value(self, context: &str) -> Result<Value, BindingError> {
        match self {
            Self::Value(value) => Ok(value),
            other => Err(BindingError::InvalidTerm(format!(
                "{context} requires a value, got {}",
                other.describe()
            ))),
        }
    }

    fn into_expression(self, context: &str) -> Result<Expression, BindingError> {
        match self {
            Self::Expression(expression) => Ok(expression),
            other => Err(BindingError::InvalidTerm(format!(
                "{context} requires an expression, got {}",
                other.describe()
            ))),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Key(key) => format!("key {key}"),
            Self::Value(value) => format!("value {value}"),
            Self::Expression(expression) => format!("expression {expression}"),
        }
    }
}

/// Binds a terminal: keys for left-hand sides, values otherwise.
fn patch_terminal(
    terminal: &Terminal,
    params: &PreparedParameters,
) -> Result<Patched, BindingError> {
    let value = match &terminal.value {
        TerminalValue::Literal(literal) => literal.to_value(),
        TerminalValue::Parameter(param) => {
            let value = params.get(param.index)?;
            if !param.ty.accepts(value) {
                return Err(BindingError::TypeMismatch {
                    index: param.index,
                    expected: param.ty.to_string(),
                    actual: value.type_description(),
                });
            }
            value.clone()
        }
    };

    if !terminal.is_lhs {
        return Ok(Patched::Value(value));
    }
    match value {
        Value::String(name) => Ok(Patched::Key(Key::new(name))),
        other => Err(BindingError::InvalidTerm(format!(
            "key must be a string, got {}",
            other.type_description()
        ))),
    }
}

fn patch_node(
    expr: &WhereExpression,
    id: NodeId,
    params: &PreparedParameters,
) -> Result<Patched, BindingError> {
    let child = |slot: Option<NodeId>, what: &str| {
        slot.ok_or_else(|| BindingError::IncompleteNode(format!("{what} of node {}", id.index())))
    };

    match expr.node(id) {
        Node::Terminal(terminal) => patch_terminal(terminal, params),
        Node::Not { child: inner } => {
            let inner = patch_node(expr, child(*inner, "child")?, params)?;
            Ok(Patched::Expression(inner.into_expression("NOT")?.not()))
        }
        Node::Binary { op, left, right } => {
            let left = patch_node(expr, child(*left, "left child")?, params)?;
            let right = patch_node(expr, child(*right, "right child")?, params)?;
            let expression = match op {
                BinaryOperator::Comparison(op) => Expression::compare(
                    left.into_key("comparison")?,
                    *op,
                    right.into_value("comparison")?,
                ),
                BinaryOperator::Logical(op) => Expression::Logical {
                    left: Box::new(left.into_expression(op.as_str())?),
                    op: *op,
                    right: Box::new(right.into_expression(op.as_str())?),
                },
            };
            Ok(Patched::Expression(expression))
        }
    }
}

/// Binds a WHERE expression.
fn patch_where(
    expr: &WhereExpression,
    params: &PreparedParameters,
) -> Result<Expression, BindingError> {
    let root = expr
        .root()
        .ok_or_else(|| BindingError::IncompleteNode(String::from("WHERE expression is empty")))?;
    patch_node(expr, root, params)?.into_expression("WHERE")
}

fn patch_sort(
    sort: &SortExpression,
    params: &PreparedParameters,
) -> Result<Vec<(Key, SortDirection)>, BindingError> {
    sort.members
        .iter()
        .map(|member| {
            let key = patch_terminal(&member.key, params)?.into_key("SORT")?;
            Ok((key, member.direction))
        })
        .collect()
}

fn patch_limit(limit: &LimitExpression, params: &PreparedParameters) -> Result<i32, BindingError> {
    match patch_terminal(&limit.value, params)?.into_value("LIMIT")? {
        Value::Int(n) => Ok(n),
        other => Err(BindingError::InvalidTerm(format!(
            "LIMIT requires an int, got {}",
            other.type_description()
        ))),
    }
}

fn patch_set_list(
    set_list: &SetList,
    params: &PreparedParameters,
) -> Result<Vec<(Key, Value)>, BindingError> {
    set_list
        .values
        .iter()
        .map(|pair| {
            if pair.key.as_parameter().is_some() {
                return Err(BindingError::InvalidTerm(String::from(
                    "LHS of set list pair must not be a free variable.",
                )));
            }
            let key = patch_terminal(&pair.key, params)?.into_key("SET")?;
            let value = patch_terminal(&pair.value, params)?.into_value("SET")?;
            Ok((key, value))
        })
        .collect()
}

impl ParsedStatement {
    /// Binds `params` into a fresh duplicate of the statement template.
    ///
    /// SET assignments are applied first, then the WHERE expression, then
    /// sort keys and the limit. All terms are bound before the duplicate is
    /// touched, so a failed binding leaves no partially bound statement.
    ///
    /// # Errors
    ///
    /// Returns a `BindingError` if a parameter is missing, out of range or of
    /// the wrong type.
    pub fn patch(&self, params: &PreparedParameters) -> Result<Statement, BindingError> {
        let ast = self.ast();
        let set = match &ast.set_list {
            Some(set_list) => patch_set_list(set_list, params)?,
            None => Vec::new(),
        };
        let filter = ast
            .suffix
            .where_expn
            .as_ref()
            .map(|expr| patch_where(expr, params))
            .transpose()?;
        let sort = match &ast.suffix.sort {
            Some(sort) => patch_sort(sort, params)?,
            None => Vec::new(),
        };
        let limit = ast
            .suffix
            .limit
            .as_ref()
            .map(|limit| patch_limit(limit, params))
            .transpose()?;

        let mut statement = self.template().raw_duplicate();
        match &mut statement {
            Statement::Query(query) => {
                if let Some(filter) = filter {
                    query.where_clause(filter);
                }
                for (key, direction) in sort {
                    query.sort(key, direction);
                }
                if let Some(limit) = limit {
                    query.limit(limit);
                }
            }
            Statement::Write(WriteStatement::Add(add)) => {
                for (key, value) in set {
                    add.set(key.name(), value);
                }
            }
            Statement::Write(WriteStatement::Replace(replace)) => {
                for (key, value) in set {
                    replace.set(key.name(), value);
                }
                if let Some(filter) = filter {
                    replace.where_clause(filter);
                }
            }
            Statement::Write(WriteStatement::Update(update)) => {
                for (key, value) in set {
                    update.set(key.name(), value);
                }
                if let Some(filter) = filter {
                    update.where_clause(filter);
                }
            }
            Statement::Write(WriteStatement::Remove(remove)) => {
                if let Some(filter) = filter {
                    remove.where_clause(filter);
                }
            }
        }

        trace!(statement = %self, bound = ?statement, "Patched statement");
        Ok(statement)
    }
}
