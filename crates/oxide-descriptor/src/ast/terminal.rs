//! Terminal nodes: literals and free parameters.

use std::fmt;

use crate::lexer::Keyword;
use crate::param::FreeParameter;
use crate::value::Value;

/// A literal value written in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Quoted string, or a bare key name.
    String(String),
    /// Integer literal.
    Int(i32),
    /// Long literal (`L` or `l` suffix).
    Long(i64),
    /// Boolean literal.
    Boolean(bool),
}

impl Literal {
    /// Converts the literal to a runtime value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Int(n) => Value::Int(*n),
            Self::Long(n) => Value::Long(*n),
            Self::Boolean(b) => Value::Boolean(*b),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "'{s}'"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Long(n) => write!(f, "{n}L"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// The content of a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalValue {
    /// A literal, bound at parse time.
    Literal(Literal),
    /// A free parameter, bound at patch time.
    Parameter(FreeParameter),
}

/// A leaf of the statement tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    /// The literal or parameter.
    pub value: TerminalValue,
    /// True if the terminal names a key rather than a value.
    pub is_lhs: bool,
}

impl Terminal {
    /// Creates a literal terminal.
    #[must_use]
    pub const fn literal(literal: Literal, is_lhs: bool) -> Self {
        Self {
            value: TerminalValue::Literal(literal),
            is_lhs,
        }
    }

    /// Creates a free parameter terminal.
    #[must_use]
    pub const fn parameter(param: FreeParameter, is_lhs: bool) -> Self {
        Self {
            value: TerminalValue::Parameter(param),
            is_lhs,
        }
    }

    /// Returns the free parameter, if this terminal is one.
    #[must_use]
    pub const fn as_parameter(&self) -> Option<&FreeParameter> {
        match &self.value {
            TerminalValue::Parameter(p) => Some(p),
            TerminalValue::Literal(_) => None,
        }
    }

    /// Returns the key name of a literal key terminal.
    #[must_use]
    pub fn key_name(&self) -> Option<&str> {
        match &self.value {
            TerminalValue::Literal(Literal::String(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TerminalValue::Parameter(p) => write!(f, "{p}"),
            TerminalValue::Literal(Literal::String(name)) if self.is_lhs && is_bare_word(name) => {
                f.write_str(name)
            }
            TerminalValue::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

/// Returns true if `text` can be written as an unquoted key name.
#[must_use]
pub fn is_bare_word(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    let numeric = first.is_ascii_digit()
        || (first == '-' && text[1..].starts_with(|c: char| c.is_ascii_digit()));

    !numeric
        && first != '?'
        && first != '\''
        && text != "true"
        && text != "false"
        && Keyword::from_str(text).is_none()
        && !text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '=' | '!' | '<' | '>' | ','))
}
