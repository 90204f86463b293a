//! Storage-level filter expressions.
//!
//! These are the fully bound expressions handed to a backing store. They
//! contain no free parameters.

use std::fmt;

use super::Key;
use crate::value::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// Equal (=)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Less than (<)
    Less,
    /// Less than or equal (<=)
    LessEqual,
    /// Greater than (>)
    Greater,
    /// Greater than or equal (>=)
    GreaterEqual,
}

impl ComparisonOperator {
    /// Parses an operator token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            "<" => Some(Self::Less),
            "<=" => Some(Self::LessEqual),
            ">" => Some(Self::Greater),
            ">=" => Some(Self::GreaterEqual),
            _ => None,
        }
    }

    /// Returns the descriptor representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// Returns the descriptor representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Returns the descriptor keyword for the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DSC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bound filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Key compared against a value: `key op value`
    Comparison {
        key: Key,
        op: ComparisonOperator,
        value: Value,
    },
    /// Logical combination of two expressions
    Logical {
        left: Box<Expression>,
        op: LogicalOperator,
        right: Box<Expression>,
    },
    /// Logical negation
    Not(Box<Expression>),
}

impl Expression {
    /// Creates a comparison expression.
    #[must_use]
    pub fn compare(key: Key, op: ComparisonOperator, value: Value) -> Self {
        Self::Comparison { key, op, value }
    }

    /// Combines two expressions with AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::Logical {
            left: Box::new(self),
            op: LogicalOperator::And,
            right: Box::new(other),
        }
    }

    /// Combines two expressions with OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Logical {
            left: Box::new(self),
            op: LogicalOperator::Or,
            right: Box::new(other),
        }
    }

    /// Negates the expression.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison { key, op, value } => write!(f, "{key} {op} {value}"),
            Self::Logical { left, op, right } => write!(f, "({left} {op} {right})"),
            Self::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}
