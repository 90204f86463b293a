//! Free-parameter type system.
//!
//! A free parameter is written as `?` followed by a type letter and an
//! optional `[` marking a list of that type:
//!
//! | Token | Type |
//! |-------|------|
//! | `?s`  | string |
//! | `?i`  | 32-bit integer |
//! | `?l`  | 64-bit integer |
//! | `?b`  | boolean |
//! | `?d`  | double |
//! | `?p`  | opaque structured value (Pojo) |
//!
//! Parameters are numbered from zero in the order they appear in the
//! descriptor. Which types are legal depends on the clause the parameter
//! appears in, see [`TermContext::permits`].

use std::fmt;

use crate::value::Value;

/// The element type of a free parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    String,
    Int,
    Long,
    Boolean,
    Double,
    Pojo,
}

impl ParameterKind {
    /// Returns the kind for a type letter.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            's' => Some(Self::String),
            'i' => Some(Self::Int),
            'l' => Some(Self::Long),
            'b' => Some(Self::Boolean),
            'd' => Some(Self::Double),
            'p' => Some(Self::Pojo),
            _ => None,
        }
    }

    /// Returns the type letter.
    #[must_use]
    pub const fn letter(&self) -> char {
        match self {
            Self::String => 's',
            Self::Int => 'i',
            Self::Long => 'l',
            Self::Boolean => 'b',
            Self::Double => 'd',
            Self::Pojo => 'p',
        }
    }
}

/// The declared type of a free parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterType {
    kind: ParameterKind,
    array: bool,
}

impl ParameterType {
    /// A single value of the given kind.
    #[must_use]
    pub const fn scalar(kind: ParameterKind) -> Self {
        Self { kind, array: false }
    }

    /// A list of values of the given kind.
    #[must_use]
    pub const fn array(kind: ParameterKind) -> Self {
        Self { kind, array: true }
    }

    /// Parses a placeholder token such as `?s` or `?l[`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let mut chars = token.strip_prefix('?')?.chars();
        let kind = ParameterKind::from_letter(chars.next()?)?;
        match chars.as_str() {
            "" => Some(Self::scalar(kind)),
            "[" => Some(Self::array(kind)),
            _ => None,
        }
    }

    /// Returns the element kind.
    #[must_use]
    pub const fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Returns true if this is a list type.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.array
    }

    /// Returns true if `value` may be bound to a parameter of this type.
    ///
    /// Primitive types and their lists must match exactly. A Pojo parameter
    /// accepts any Pojo whatever its concrete type, as long as a list is bound
    /// to a list placeholder and a single value to a scalar one.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self.kind {
            ParameterKind::Pojo => match value {
                Value::Pojo(_) => !self.array,
                Value::PojoList(_) => self.array,
                _ => false,
            },
            _ => value.parameter_type() == *self,
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.kind.letter())?;
        if self.array {
            write!(f, "[")?;
        }
        Ok(())
    }
}

/// A typed placeholder with its position in the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FreeParameter {
    /// Zero-based index in left-to-right order.
    pub index: usize,
    /// The declared type.
    pub ty: ParameterType,
}

impl fmt::Display for FreeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ty.fmt(f)
    }
}

/// The grammatical position a term is parsed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermContext {
    /// Either side of a SET pair.
    SetList,
    /// Either side of a WHERE comparison.
    Where,
    /// A SORT key.
    Sort,
    /// The LIMIT value.
    Limit,
}

impl TermContext {
    /// Returns the clause name used in diagnostics.
    #[must_use]
    pub const fn clause(&self) -> &'static str {
        match self {
            Self::SetList => "SET",
            Self::Where => "WHERE",
            Self::Sort => "SORT",
            Self::Limit => "LIMIT",
        }
    }

    /// Returns true if a parameter of type `ty` may appear in this context.
    #[must_use]
    pub const fn permits(&self, ty: ParameterType) -> bool {
        match self {
            Self::SetList => true,
            Self::Where => !ty.array && !matches!(ty.kind, ParameterKind::Pojo),
            Self::Sort => !ty.array && matches!(ty.kind, ParameterKind::String),
            Self::Limit => !ty.array && matches!(ty.kind, ParameterKind::Int),
        }
    }
}
