//! Token types for the descriptor tokenizer.

use super::Span;

/// Descriptor keywords.
///
/// Keywords are case sensitive: `WHERE` is a keyword, `where` is a bare word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // Statement types
    Query,
    Add,
    Replace,
    Update,
    Remove,

    // Clauses
    Set,
    Where,
    Sort,
    Limit,

    // Logical operators
    And,
    Or,
    Not,

    // Sort directions
    Asc,
    Dsc,
}

impl Keyword {
    /// Attempts to parse a keyword from a token text.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "QUERY" => Some(Self::Query),
            "ADD" => Some(Self::Add),
            "REPLACE" => Some(Self::Replace),
            "UPDATE" => Some(Self::Update),
            "REMOVE" => Some(Self::Remove),
            "SET" => Some(Self::Set),
            "WHERE" => Some(Self::Where),
            "SORT" => Some(Self::Sort),
            "LIMIT" => Some(Self::Limit),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "ASC" => Some(Self::Asc),
            "DSC" => Some(Self::Dsc),
            _ => None,
        }
    }

    /// Returns the descriptor spelling of the keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Add => "ADD",
            Self::Replace => "REPLACE",
            Self::Update => "UPDATE",
            Self::Remove => "REMOVE",
            Self::Set => "SET",
            Self::Where => "WHERE",
            Self::Sort => "SORT",
            Self::Limit => "LIMIT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Asc => "ASC",
            Self::Dsc => "DSC",
        }
    }
}

/// A token with its location in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The raw token text.
    pub text: String,
    /// The span in the descriptor.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// Returns the keyword this token spells, if any.
    #[must_use]
    pub fn keyword(&self) -> Option<Keyword> {
        Keyword::from_str(&self.text)
    }

    /// Returns true if the token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.text == keyword.as_str()
    }

    /// Returns true if the token text equals `text`.
    #[must_use]
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}
