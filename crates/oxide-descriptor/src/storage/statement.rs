//! Statement interfaces implemented by backing stores.
//!
//! Query statements and the four write statements are separate traits, each
//! exposing only the operations legal for its kind: only queries can be
//! sorted or limited, only ADD, REPLACE and UPDATE carry assignments, and ADD
//! cannot be filtered.

use std::fmt;

use super::{Category, Expression, Key, SortDirection};
use crate::error::StorageError;
use crate::value::Value;

/// A lazy sequence of result documents.
pub type Cursor = Box<dyn Iterator<Item = Result<serde_json::Value, StorageError>> + Send>;

/// Aggregate functions supported by aggregate queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    /// Number of matching records.
    Count,
    /// Distinct values of the aggregate key.
    Distinct,
}

impl AggregateFunction {
    /// Returns the statement type spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "QUERY-COUNT",
            Self::Distinct => "QUERY-DISTINCT",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A statement that can be restricted with a WHERE expression.
pub trait Filter {
    /// Sets the WHERE expression.
    fn where_clause(&mut self, expression: Expression);
}

/// A statement that assigns values to keys.
pub trait Assign {
    /// Assigns `value` to the key named `key`.
    fn set(&mut self, key: &str, value: Value);
}

/// A statement that modifies stored data.
pub trait Execute {
    /// Executes the statement, returning the number of affected records.
    ///
    /// # Errors
    ///
    /// Returns the backing store's failure.
    fn execute(&self) -> Result<u64, StorageError>;
}

/// A read statement.
pub trait QueryStatement: Filter + fmt::Debug + Send + Sync {
    /// Adds a sort key.
    fn sort(&mut self, key: Key, direction: SortDirection);

    /// Limits the number of results.
    fn limit(&mut self, limit: i32);

    /// Executes the query, returning a lazy cursor over its results.
    ///
    /// # Errors
    ///
    /// Returns the backing store's failure.
    fn execute_query(&self) -> Result<Cursor, StorageError>;

    /// Returns an unbound copy carrying no execution state.
    fn raw_duplicate(&self) -> Box<dyn QueryStatement>;
}

/// An ADD statement.
pub trait AddStatement: Assign + Execute + fmt::Debug + Send + Sync {
    /// Returns an unbound copy carrying no execution state.
    fn raw_duplicate(&self) -> Box<dyn AddStatement>;
}

/// A REPLACE statement.
pub trait ReplaceStatement: Assign + Filter + Execute + fmt::Debug + Send + Sync {
    /// Returns an unbound copy carrying no execution state.
    fn raw_duplicate(&self) -> Box<dyn ReplaceStatement>;
}

/// An UPDATE statement.
pub trait UpdateStatement: Assign + Filter + Execute + fmt::Debug + Send + Sync {
    /// Returns an unbound copy carrying no execution state.
    fn raw_duplicate(&self) -> Box<dyn UpdateStatement>;
}

/// A REMOVE statement.
pub trait RemoveStatement: Filter + Execute + fmt::Debug + Send + Sync {
    /// Returns an unbound copy carrying no execution state.
    fn raw_duplicate(&self) -> Box<dyn RemoveStatement>;
}

/// A write statement of any kind.
#[derive(Debug)]
pub enum WriteStatement {
    Add(Box<dyn AddStatement>),
    Replace(Box<dyn ReplaceStatement>),
    Update(Box<dyn UpdateStatement>),
    Remove(Box<dyn RemoveStatement>),
}

impl WriteStatement {
    /// Returns an unbound copy of the statement.
    #[must_use]
    pub fn raw_duplicate(&self) -> Self {
        match self {
            Self::Add(s) => Self::Add(s.raw_duplicate()),
            Self::Replace(s) => Self::Replace(s.raw_duplicate()),
            Self::Update(s) => Self::Update(s.raw_duplicate()),
            Self::Remove(s) => Self::Remove(s.raw_duplicate()),
        }
    }

    /// Executes the statement.
    ///
    /// # Errors
    ///
    /// Returns the backing store's failure.
    pub fn execute(&self) -> Result<u64, StorageError> {
        match self {
            Self::Add(s) => s.execute(),
            Self::Replace(s) => s.execute(),
            Self::Update(s) => s.execute(),
            Self::Remove(s) => s.execute(),
        }
    }
}

/// A backing store statement, either a query or a write.
#[derive(Debug)]
pub enum Statement {
    Query(Box<dyn QueryStatement>),
    Write(WriteStatement),
}

impl Statement {
    /// Returns an unbound copy of the statement.
    #[must_use]
    pub fn raw_duplicate(&self) -> Self {
        match self {
            Self::Query(q) => Self::Query(q.raw_duplicate()),
            Self::Write(w) => Self::Write(w.raw_duplicate()),
        }
    }

    /// Returns true for query statements.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

/// Factory for statements of a backing store.
pub trait BackingStorage: Send + Sync {
    /// Creates a plain query.
    fn create_query(&self, category: &Category) -> Box<dyn QueryStatement>;

    /// Creates an aggregate query over the optional aggregate key.
    fn create_aggregate_query(
        &self,
        function: AggregateFunction,
        category: &Category,
        key: Option<Key>,
    ) -> Box<dyn QueryStatement>;

    /// Creates an ADD statement.
    fn create_add(&self, category: &Category) -> Box<dyn AddStatement>;

    /// Creates a REPLACE statement.
    fn create_replace(&self, category: &Category) -> Box<dyn ReplaceStatement>;

    /// Creates an UPDATE statement.
    fn create_update(&self, category: &Category) -> Box<dyn UpdateStatement>;

    /// Creates a REMOVE statement.
    fn create_remove(&self, category: &Category) -> Box<dyn RemoveStatement>;
}
