//! Cache of parsed statements.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::Result;
use crate::parsed::ParsedStatement;
use crate::parser::DescriptorParseError;
use crate::prepared::PreparedStatement;
use crate::storage::{BackingStorage, StatementDescriptor};

/// Category name and descriptor text.
type CacheKey = (String, String);

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<CacheKey, Arc<ParsedStatement>>,
    /// Insertion order, oldest first.
    order: VecDeque<CacheKey>,
}

/// A thread-safe cache of parsed statements.
///
/// Statements are keyed by category name and descriptor text. Once the cache
/// holds `capacity` statements, the oldest one is evicted. A capacity of
/// zero disables caching.
#[derive(Debug)]
pub struct StatementCache {
    capacity: usize,
    entries: RwLock<Entries>,
}

impl StatementCache {
    /// The capacity used by [`StatementCache::new`].
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a cache with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a cache holding at most `capacity` statements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Returns the maximum number of cached statements.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of cached statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read(|entries| entries.map.len())
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached statement for `descriptor`, if any.
    #[must_use]
    pub fn get(&self, descriptor: &StatementDescriptor) -> Option<Arc<ParsedStatement>> {
        let key = cache_key(descriptor);
        self.read(|entries| entries.map.get(&key).cloned())
            .filter(|parsed| parsed.descriptor() == descriptor)
    }

    /// Returns the cached statement for `descriptor`, parsing and caching it
    /// on a miss.
    ///
    /// # Errors
    ///
    /// Returns a `DescriptorParseError` if the descriptor is invalid. Invalid
    /// descriptors are not cached.
    pub fn get_or_parse(
        &self,
        storage: &dyn BackingStorage,
        descriptor: &StatementDescriptor,
    ) -> std::result::Result<Arc<ParsedStatement>, DescriptorParseError> {
        if let Some(parsed) = self.get(descriptor) {
            debug!(descriptor = %descriptor, "Statement cache hit");
            return Ok(parsed);
        }

        debug!(descriptor = %descriptor, "Statement cache miss");
        let parsed = Arc::new(ParsedStatement::parse(storage, descriptor)?);
        if self.capacity == 0 {
            return Ok(parsed);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let key = cache_key(descriptor);
        if let Some(existing) = entries.map.get(&key) {
            if existing.descriptor() == descriptor {
                return Ok(Arc::clone(existing));
            }
            entries.map.remove(&key);
            entries.order.retain(|k| *k != key);
        }

        while entries.map.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
            debug!(category = %oldest.0, descriptor = %oldest.1, "Statement cache eviction");
        }

        entries.map.insert(key.clone(), Arc::clone(&parsed));
        entries.order.push_back(key);
        Ok(parsed)
    }

    /// Prepares `descriptor` from the cache.
    ///
    /// # Errors
    ///
    /// Returns `StatementExecutionError::Descriptor` if the descriptor is
    /// invalid.
    pub fn prepare(
        &self,
        storage: &dyn BackingStorage,
        descriptor: &StatementDescriptor,
    ) -> Result<PreparedStatement> {
        let parsed = self.get_or_parse(storage, descriptor)?;
        Ok(PreparedStatement::from_parsed(parsed))
    }

    /// Removes all cached statements.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.map.clear();
        entries.order.clear();
    }

    fn read<T>(&self, f: impl FnOnce(&Entries) -> T) -> T {
        f(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for StatementCache {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(descriptor: &StatementDescriptor) -> CacheKey {
    (
        descriptor.category().name().to_string(),
        descriptor.descriptor().to_string(),
    )
}
