//! Statement-level AST types.

use std::fmt;

use super::{Terminal, WhereExpression};
use crate::storage::{AggregateFunction, SortDirection};

/// Kinds of read statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// `QUERY`
    Query,
    /// `QUERY-COUNT`
    Count,
    /// `QUERY-DISTINCT`
    Distinct,
}

impl QueryKind {
    /// Returns the aggregate function of an aggregate query.
    #[must_use]
    pub const fn aggregate(&self) -> Option<AggregateFunction> {
        match self {
            Self::Query => None,
            Self::Count => Some(AggregateFunction::Count),
            Self::Distinct => Some(AggregateFunction::Distinct),
        }
    }

    /// Returns the statement type spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self.aggregate() {
            Some(function) => function.as_str(),
            None => "QUERY",
        }
    }
}

/// Kinds of write statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteKind {
    Add,
    Replace,
    Update,
    Remove,
}

impl WriteKind {
    /// Returns the statement type spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Replace => "REPLACE",
            Self::Update => "UPDATE",
            Self::Remove => "REMOVE",
        }
    }
}

/// The kind of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Query(QueryKind),
    Write(WriteKind),
}

impl StatementKind {
    /// Returns the statement type spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query(kind) => kind.as_str(),
            Self::Write(kind) => kind.as_str(),
        }
    }

    /// Returns true for the query family.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `key = value` pair of a SET list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetListValue {
    pub key: Terminal,
    pub value: Terminal,
}

impl fmt::Display for SetListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

/// A SET list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetList {
    pub values: Vec<SetListValue>,
}

impl SetList {
    /// Returns the literal key names, skipping free parameters.
    pub fn key_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(|pair| pair.key.key_name())
    }
}

impl fmt::Display for SetList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SET ")?;
        write_separated(f, &self.values)
    }
}

/// One member of a SORT list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortMember {
    pub key: Terminal,
    pub direction: SortDirection,
}

impl fmt::Display for SortMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.direction)
    }
}

/// A SORT list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortExpression {
    pub members: Vec<SortMember>,
}

impl fmt::Display for SortExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SORT ")?;
        write_separated(f, &self.members)
    }
}

/// A LIMIT value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitExpression {
    pub value: Terminal,
}

impl fmt::Display for LimitExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LIMIT {}", self.value)
    }
}

/// The optional WHERE, SORT and LIMIT clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixExpression {
    pub where_expn: Option<WhereExpression>,
    pub sort: Option<SortExpression>,
    pub limit: Option<LimitExpression>,
}

impl SuffixExpression {
    /// Returns true if no clause is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.where_expn.is_none() && self.sort.is_none() && self.limit.is_none()
    }
}

impl fmt::Display for SuffixExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(where_expn) = &self.where_expn {
            write!(f, "WHERE {where_expn}")?;
            sep = " ";
        }
        if let Some(sort) = &self.sort {
            write!(f, "{sep}{sort}")?;
            sep = " ";
        }
        if let Some(limit) = &self.limit {
            write!(f, "{sep}{limit}")?;
        }
        Ok(())
    }
}

/// A parsed statement descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementAst {
    /// The statement kind.
    pub kind: StatementKind,
    /// The key of an aggregate query, as written in parentheses.
    pub aggregate_key: Option<String>,
    /// The category name.
    pub category: String,
    /// The SET list.
    pub set_list: Option<SetList>,
    /// The WHERE, SORT and LIMIT clauses.
    pub suffix: SuffixExpression,
    /// The number of free parameters.
    pub parameter_count: usize,
}

impl fmt::Display for StatementAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        if let Some(key) = &self.aggregate_key {
            write!(f, "({key})")?;
        }
        write!(f, " {}", self.category)?;
        if let Some(set_list) = &self.set_list {
            write!(f, " {set_list}")?;
        }
        if !self.suffix.is_empty() {
            write!(f, " {}", self.suffix)?;
        }
        Ok(())
    }
}

fn write_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" , ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
