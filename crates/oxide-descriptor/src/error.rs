//! Binding, storage and execution errors.

use crate::ast::StatementKind;
use crate::parser::DescriptorParseError;

/// Errors raised while binding parameter values into a parsed statement.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// A parameter index outside the placeholder range.
    #[error("Parameter index '{index}' out of range (statement has {count} parameters)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of placeholders.
        count: usize,
    },

    /// A placeholder without a bound value.
    #[error("No value bound for parameter {index}")]
    UnboundParameter {
        /// The placeholder index.
        index: usize,
    },

    /// A bound value of the wrong type.
    #[error("Expected parameter {index} of type {expected} but got {actual}")]
    TypeMismatch {
        /// The placeholder index.
        index: usize,
        /// The declared placeholder type.
        expected: String,
        /// The runtime type of the bound value.
        actual: String,
    },

    /// A node of the statement tree is not fully built.
    #[error("Incomplete statement tree: {0}")]
    IncompleteNode(String),

    /// A term that cannot be bound at its position.
    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    /// A value bound as Pojo that is not a structured object.
    #[error("Value of type '{type_name}' does not serialize to an object")]
    NotAPojo {
        /// The Rust type of the value.
        type_name: String,
    },

    /// Serializing a Pojo failed.
    #[error("Failed to serialize Pojo: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors reported by a backing store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store failed to execute a statement.
    #[error("Storage failure: {0}")]
    Backend(String),

    /// The backing store does not support the statement.
    #[error("Unsupported statement: {0}")]
    Unsupported(String),
}

/// The single error surface of prepared statement execution.
#[derive(Debug, thiserror::Error)]
pub enum StatementExecutionError {
    /// The descriptor could not be parsed.
    #[error("Descriptor parsing failed: {0}")]
    Descriptor(#[from] DescriptorParseError),

    /// Parameters could not be bound.
    #[error("Parameter binding failed: {0}")]
    Binding(#[from] BindingError),

    /// The backing store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The operation does not apply to this kind of statement.
    #[error("{operation} is not valid for {kind} statements")]
    IllegalOperation {
        /// The attempted operation.
        operation: &'static str,
        /// The statement kind.
        kind: StatementKind,
    },
}

/// Result type for prepared statement execution.
pub type Result<T> = std::result::Result<T, StatementExecutionError>;
