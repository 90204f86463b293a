//! Descriptor parsing errors.

use crate::lexer::Span;

/// A descriptor parsing error.
///
/// Raised by the tokenizer, the grammar parser and the semantic validator.
/// The error displays as its message alone; the location is kept separately.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DescriptorParseError {
    /// The error message.
    pub message: String,
    /// The location of the error, if it can be pinned to a token.
    pub span: Option<Span>,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<String>,
}

impl DescriptorParseError {
    /// Creates a new error not tied to a location.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
            expected: None,
            found: None,
        }
    }

    /// Creates a new error located at `span`.
    #[must_use]
    pub fn at(message: impl Into<String>, span: Span) -> Self {
        Self {
            span: Some(span),
            ..Self::new(message)
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        let expected: String = expected.into();
        let found: String = found.into();
        Self {
            message: format!("Unexpected token: expected {expected}, found '{found}'"),
            span: Some(span),
            expected: Some(expected),
            found: Some(found),
        }
    }

    /// Creates an "unexpected end of descriptor" error.
    #[must_use]
    pub fn unexpected_eof(expected: impl Into<String>, offset: usize) -> Self {
        let expected: String = expected.into();
        Self {
            message: format!("Premature end of descriptor: expected {expected}"),
            span: Some(Span::at(offset)),
            expected: Some(expected),
            found: None,
        }
    }
}
