//! Per-generation lookup cache.
//!
//! Reports that resolve ids to display names (tax rates, payment methods)
//! create one cache per generation call and pass it down explicitly. Nothing
//! survives the call, so two generations never share entries.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

/// Map filled on first lookup of each key.
#[derive(Debug)]
pub struct LookupCache<K, V> {
    entries: HashMap<K, V>,
    hits: usize,
    misses: usize,
}

impl<K, V> Default for LookupCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<K, V> LookupCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, calling `load` on a miss.
    ///
    /// A failed load caches nothing.
    pub async fn get_or_load<F, Fut, E>(&mut self, key: &K, load: F) -> Result<V, E>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.entries.get(key) {
            self.hits += 1;
            return Ok(value.clone());
        }

        self.misses += 1;
        let value = load(key.clone()).await?;
        self.entries.insert(key.clone(), value.clone());
        Ok(value)
    }

    /// Lookups answered from the cache.
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that called the loader.
    #[must_use]
    pub const fn misses(&self) -> usize {
        self.misses
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
