//! Categories, keys and statement descriptors.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::param::ParameterType;

/// A named column-like identifier of a category.
///
/// A key may declare the type of the values stored under it. Identity is the
/// name alone: keys resolved from descriptor text carry no type and still
/// equal the declared key of the same name.
#[derive(Debug, Clone)]
pub struct Key {
    name: String,
    value_type: Option<ParameterType>,
}

impl Key {
    /// Creates an untyped key.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: None,
        }
    }

    /// Creates a key holding values of type `value_type`.
    #[must_use]
    pub fn typed(name: impl Into<String>, value_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            value_type: Some(value_type),
        }
    }

    /// Returns the key name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared value type, if any.
    #[must_use]
    pub const fn value_type(&self) -> Option<ParameterType> {
        self.value_type
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A schema-like collection identity with a fixed set of keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    keys: Vec<Key>,
}

impl Category {
    /// Creates a category.
    #[must_use]
    pub fn new(name: impl Into<String>, keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            name: name.into(),
            keys: keys.into_iter().collect(),
        }
    }

    /// Returns the category name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all keys in declaration order.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Looks up a key by name.
    #[must_use]
    pub fn key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().find(|k| k.name == name)
    }

    /// Returns true if the category declares a key with this name.
    #[must_use]
    pub fn has_key(&self, name: &str) -> bool {
        self.key(name).is_some()
    }

    /// Returns the key names as an ordered set.
    #[must_use]
    pub fn key_names(&self) -> BTreeSet<&str> {
        self.keys.iter().map(Key::name).collect()
    }
}

/// The textual description of a statement against a category.
///
/// Descriptors are immutable and cheap to clone; the category is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementDescriptor {
    category: Arc<Category>,
    descriptor: String,
}

impl StatementDescriptor {
    /// Creates a descriptor for `category`.
    #[must_use]
    pub fn new(category: Arc<Category>, descriptor: impl Into<String>) -> Self {
        Self {
            category,
            descriptor: descriptor.into(),
        }
    }

    /// Returns the category the descriptor is written against.
    #[must_use]
    pub fn category(&self) -> &Arc<Category> {
        &self.category
    }

    /// Returns the descriptor text.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }
}

impl fmt::Display for StatementDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}
