//! Cache Store Module
//!
//! Authoritative key → entry mapping with capacity enforcement.

use std::collections::HashMap;
use std::hash::Hash;

use tokio::sync::RwLock;

use crate::cache::CacheEntry;
use crate::error::OverflowError;

// == Store ==
/// Concurrency-safe entry map bounded by a maximum entry count.
///
/// Every operation takes the internal lock itself, so callers never need
/// external locking. The store does not read the clock: expiry-aware
/// operations take `now` from the caller.
#[derive(Debug)]
pub struct Store<K, V> {
    /// Key-value storage
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    /// Maximum number of entries allowed
    capacity: usize,
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Size ==
    /// Returns the current number of entries, expired ones included.
    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Insert ==
    /// Writes or replaces an entry without checking capacity.
    pub async fn insert(&self, key: K, entry: CacheEntry<V>) {
        self.entries.write().await.insert(key, entry);
    }

    // == Admit ==
    /// Inserts an entry only if the store has room for it.
    ///
    /// Expired entries are purged, capacity is checked and the entry is
    /// written under a single write lock, so two concurrent admissions can
    /// never both observe the last free slot. Replacing a live key does not
    /// grow the map and is always admitted. On rejection the store is left
    /// untouched.
    pub async fn admit(
        &self,
        key: K,
        entry: CacheEntry<V>,
        now: i64,
    ) -> Result<(), OverflowError<K>> {
        let mut entries = self.entries.write().await;
        purge_locked(&mut entries, now);

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            return Err(OverflowError::new(key));
        }

        entries.insert(key, entry);
        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key. No-op if absent.
    pub async fn delete(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    // == Purge Expired ==
    /// Removes every entry that is expired at `now`.
    ///
    /// Returns the number of entries removed. Running it again with the same
    /// `now` removes nothing.
    pub async fn purge_expired(&self, now: i64) -> usize {
        let mut entries = self.entries.write().await;
        purge_locked(&mut entries, now)
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    // == Lookup ==
    /// Returns a copy of the entry stored under `key`, expired or not.
    pub async fn lookup(&self, key: &K) -> Option<CacheEntry<V>> {
        self.entries.read().await.get(key).cloned()
    }
}

/// Drops expired entries from an already-locked map.
fn purge_locked<K, V>(entries: &mut HashMap<K, CacheEntry<V>>, now: i64) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before - entries.len()
}
