//! Path-keyed caches for compiled programs and extension results.
//!
//! Entries are never evicted: one loader serves one snapshot of the source
//! tree. The store is a trait so an invalidating implementation can replace
//! [`MemoryStore`] without touching the loader.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

pub trait CacheStore<V>: Send + Sync {
    fn get(&self, path: &Path) -> Option<V>;

    fn insert(&self, path: PathBuf, value: V);
}

/// Lookup counters of a [`MemoryStore`].
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub inserts: usize,
}

/// In-memory store that counts how it is used.
pub struct MemoryStore<V> {
    entries: RwLock<FxHashMap<PathBuf, V>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    inserts: AtomicUsize,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        MemoryStore {
            entries: RwLock::new(FxHashMap::default()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
        }
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.read().contains_key(path)
    }
}

impl<V: Clone + Send + Sync> CacheStore<V> for MemoryStore<V> {
    fn get(&self, path: &Path) -> Option<V> {
        let found = self.entries.read().get(path).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn insert(&self, path: PathBuf, value: V) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        self.entries.write().insert(path, value);
    }
}
