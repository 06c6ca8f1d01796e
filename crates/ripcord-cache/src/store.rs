//! Keyed object store
//!
//! A shard keeps one `Store` per object family it tracks. Recency is a
//! monotonic counter bumped on insert and lookup, so eviction picks the
//! entry that was touched longest ago.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

struct Entry<V> {
    last_used: u64,
    value: V,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    clock: u64,
}

/// Keyed object store, safe to share behind `Arc` across tasks.
///
/// `capacity == 0` stores everything; `capacity > 0` evicts the
/// least-recently-used entry once full.
pub struct Store<K, V> {
    inner: Mutex<Inner<K, V>>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> Store<K, V> {
    /// Create a store with the given capacity (0 = unbounded)
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                clock: 0,
            }),
            capacity,
        })
    }

    /// Insert a value, evicting the least-recently-used entry if the
    /// store is bounded and full
    pub fn add(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        if self.capacity > 0
            && inner.entries.len() >= self.capacity
            && !inner.entries.contains_key(&key)
        {
            if let Some(oldest) = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone())
            {
                inner.entries.remove(&oldest);
            }
        }
        inner.clock += 1;
        let last_used = inner.clock;
        inner.entries.insert(key, Entry { last_used, value });
    }

    /// Replace the value for a key, inserting if absent
    pub fn update(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        inner.clock += 1;
        let last_used = inner.clock;
        match inner.entries.get_mut(&key) {
            Some(entry) => {
                entry.last_used = last_used;
                entry.value = value;
            }
            None => {
                drop(inner);
                self.add(key, value);
            }
        }
    }

    /// Fetch a clone of the value for a key, refreshing its recency
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        inner.clock += 1;
        let last_used = inner.clock;
        inner.entries.get_mut(key).map(|entry| {
            entry.last_used = last_used;
            entry.value.clone()
        })
    }

    /// Whether a key is present (does not refresh recency)
    pub fn has(&self, key: &K) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Remove a key
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().entries.remove(key).map(|entry| entry.value)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
