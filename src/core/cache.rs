use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use anyhow::Result;
use log::{debug, trace};

/// Memoizing factory: each key's value is built once on first request and cloned afterwards.
///
/// Values are normally `Arc`s so that clones share the one constructed resource.
#[derive(Debug)]
pub struct ResourceCache<K, V> {
    name: &'static str,
    entries: HashMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K, V> ResourceCache<K, V>
where
    K: Hash + Eq + Debug,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_or_insert_with(&mut self, key: K, build: impl FnOnce(&K) -> V) -> V {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            trace!("{} cache hit for {:?}", self.name, key);
            return value.clone();
        }

        self.misses += 1;
        debug!("{} cache miss for {:?}", self.name, key);
        let value = build(&key);
        self.entries.insert(key, value.clone());
        value
    }

    /// Like `get_or_insert_with`, but nothing is stored when construction fails
    pub fn get_or_try_insert_with(
        &mut self,
        key: K,
        build: impl FnOnce(&K) -> Result<V>,
    ) -> Result<V> {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            trace!("{} cache hit for {:?}", self.name, key);
            return Ok(value.clone());
        }

        self.misses += 1;
        debug!("{} cache miss for {:?}", self.name, key);
        let value = build(&key)?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
