//! Backing store interfaces.
//!
//! The parser and patch engine only talk to storage through these types: a
//! [`Category`] supplies the legal keys, a [`BackingStorage`] creates raw
//! statement templates, and bound [`Expression`]s are handed to them.

mod category;
mod expression;
mod statement;

pub use category::{Category, Key, StatementDescriptor};
pub use expression::{ComparisonOperator, Expression, LogicalOperator, SortDirection};
pub use statement::{
    AddStatement, AggregateFunction, Assign, BackingStorage, Cursor, Execute, Filter,
    QueryStatement, RemoveStatement, ReplaceStatement, Statement, UpdateStatement,
    WriteStatement,
};
