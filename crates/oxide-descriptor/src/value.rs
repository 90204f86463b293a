//! Runtime values bound to free parameters.
//!
//! Every value carries its own type, so binding can be checked against the
//! placeholder type declared in the descriptor.

use std::fmt;

use serde::Serialize;

use crate::error::BindingError;
use crate::param::{ParameterKind, ParameterType};

/// An opaque structured value.
///
/// Pojos are captured as JSON object documents together with the name of the
/// Rust type they were serialized from.
#[derive(Debug, Clone, PartialEq)]
pub struct Pojo {
    type_name: &'static str,
    document: serde_json::Map<String, serde_json::Value>,
}

impl Pojo {
    /// Serializes `value` into a Pojo.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::Serialization` if serialization fails and
    /// `BindingError::NotAPojo` if the value does not serialize to an object.
    pub fn new<T: Serialize>(value: &T) -> Result<Self, BindingError> {
        let type_name = std::any::type_name::<T>();
        match serde_json::to_value(value)? {
            serde_json::Value::Object(document) => Ok(Self {
                type_name,
                document,
            }),
            _ => Err(BindingError::NotAPojo {
                type_name: type_name.to_string(),
            }),
        }
    }

    /// Creates a Pojo from an already built document.
    #[must_use]
    pub const fn from_document(
        type_name: &'static str,
        document: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            type_name,
            document,
        }
    }

    /// Returns the name of the type this Pojo was created from.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the captured document.
    #[must_use]
    pub const fn document(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.document
    }
}

/// A typed value that can be bound to a free parameter or used as a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// String value.
    String(String),
    /// 32-bit integer value.
    Int(i32),
    /// 64-bit integer value.
    Long(i64),
    /// Boolean value.
    Boolean(bool),
    /// Double value.
    Double(f64),
    /// Opaque structured value.
    Pojo(Pojo),
    /// List of strings.
    StringList(Vec<String>),
    /// List of 32-bit integers.
    IntList(Vec<i32>),
    /// List of 64-bit integers.
    LongList(Vec<i64>),
    /// List of booleans.
    BooleanList(Vec<bool>),
    /// List of doubles.
    DoubleList(Vec<f64>),
    /// List of opaque structured values.
    PojoList(Vec<Pojo>),
}

impl Value {
    /// Returns the parameter type this value satisfies.
    #[must_use]
    pub const fn parameter_type(&self) -> ParameterType {
        match self {
            Self::String(_) => ParameterType::scalar(ParameterKind::String),
            Self::Int(_) => ParameterType::scalar(ParameterKind::Int),
            Self::Long(_) => ParameterType::scalar(ParameterKind::Long),
            Self::Boolean(_) => ParameterType::scalar(ParameterKind::Boolean),
            Self::Double(_) => ParameterType::scalar(ParameterKind::Double),
            Self::Pojo(_) => ParameterType::scalar(ParameterKind::Pojo),
            Self::StringList(_) => ParameterType::array(ParameterKind::String),
            Self::IntList(_) => ParameterType::array(ParameterKind::Int),
            Self::LongList(_) => ParameterType::array(ParameterKind::Long),
            Self::BooleanList(_) => ParameterType::array(ParameterKind::Boolean),
            Self::DoubleList(_) => ParameterType::array(ParameterKind::Double),
            Self::PojoList(_) => ParameterType::array(ParameterKind::Pojo),
        }
    }

    /// Describes the runtime type, naming the concrete type of Pojos.
    #[must_use]
    pub fn type_description(&self) -> String {
        match self {
            Self::Pojo(pojo) => format!("Pojo({})", pojo.type_name()),
            Self::PojoList(pojos) => match pojos.first() {
                Some(pojo) => format!("Pojo({})[]", pojo.type_name()),
                None => String::from("Pojo[]"),
            },
            other => other.parameter_type().to_string(),
        }
    }

    /// Converts the value to JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        let pojo = |p: &Pojo| Json::Object(p.document().clone());
        match self {
            Self::String(s) => Json::from(s.as_str()),
            Self::Int(n) => Json::from(*n),
            Self::Long(n) => Json::from(*n),
            Self::Boolean(b) => Json::from(*b),
            Self::Double(f) => Json::from(*f),
            Self::Pojo(p) => pojo(p),
            Self::StringList(v) => Json::from(v.clone()),
            Self::IntList(v) => Json::from(v.clone()),
            Self::LongList(v) => Json::from(v.clone()),
            Self::BooleanList(v) => Json::from(v.clone()),
            Self::DoubleList(v) => Json::from(v.clone()),
            Self::PojoList(v) => Json::Array(v.iter().map(pojo).collect()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "'{s}'"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Long(n) => write!(f, "{n}L"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Double(d) => write!(f, "{d}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Trait for types that can be converted to values.
pub trait ToValue {
    /// Converts the value to a `Value`.
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::String(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::String(String::from(self))
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::Int(self)
    }
}

impl ToValue for i64 {
    fn to_value(self) -> Value {
        Value::Long(self)
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Boolean(self)
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Double(self)
    }
}

impl ToValue for Pojo {
    fn to_value(self) -> Value {
        Value::Pojo(self)
    }
}

impl ToValue for Vec<String> {
    fn to_value(self) -> Value {
        Value::StringList(self)
    }
}

impl ToValue for Vec<&str> {
    fn to_value(self) -> Value {
        Value::StringList(self.into_iter().map(String::from).collect())
    }
}

impl ToValue for Vec<i32> {
    fn to_value(self) -> Value {
        Value::IntList(self)
    }
}

impl ToValue for Vec<i64> {
    fn to_value(self) -> Value {
        Value::LongList(self)
    }
}

impl ToValue for Vec<bool> {
    fn to_value(self) -> Value {
        Value::BooleanList(self)
    }
}

impl ToValue for Vec<f64> {
    fn to_value(self) -> Value {
        Value::DoubleList(self)
    }
}

impl ToValue for Vec<Pojo> {
    fn to_value(self) -> Value {
        Value::PojoList(self)
    }
}
