//! TTL Cache Module
//!
//! Public facade: admission control, TTL resolution and reaper lifecycle.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cache::{current_timestamp_ms, expires_at_from, CacheEntry, Store};
use crate::config::CacheConfig;
use crate::error::{ConfigError, ConfigResult, OverflowError};
use crate::tasks::{spawn_reaper, Reaper};

// == TTL Cache ==
/// Bounded key-value cache with per-entry TTL and a cache-wide default.
///
/// Once full, new keys are rejected rather than evicting anything. Expired
/// entries are purged inline on every `put`/`get` and periodically by a
/// background reaper owned by the cache.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    store: Arc<Store<K, V>>,
    config: CacheConfig,
    reaper: Mutex<Option<Reaper>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates the cache and starts its reaper.
    ///
    /// Fails if the configuration is invalid or if called outside a tokio
    /// runtime.
    pub fn new(config: CacheConfig) -> ConfigResult<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;

        let store = Arc::new(Store::new(config.max_size));
        let reaper = spawn_reaper(
            &runtime,
            Arc::clone(&store),
            Duration::from_secs(config.cleanup_interval),
        );

        info!(
            "Cache initialized: max_size={}, global_timeout={}s, cleanup_interval={}s",
            config.max_size, config.global_timeout, config.cleanup_interval
        );

        Ok(Self {
            store,
            config,
            reaper: Mutex::new(Some(reaper)),
        })
    }

    // == Put ==
    /// Stores a value with the cache-wide default TTL.
    pub async fn put(&self, key: K, value: V) -> Result<(), OverflowError<K>> {
        self.put_with_ttl(key, value, self.config.global_timeout)
            .await
    }

    // == Put With TTL ==
    /// Stores a value that expires `ttl_seconds` from now.
    ///
    /// Expired entries are purged first, so a cache full of stale entries
    /// still accepts the write. Replacing a live key always succeeds.
    ///
    /// # Errors
    /// [`OverflowError`] carrying `key` if the cache is full of live
    /// entries. Nothing is changed in that case.
    pub async fn put_with_ttl(
        &self,
        key: K,
        value: V,
        ttl_seconds: u64,
    ) -> Result<(), OverflowError<K>> {
        let now = current_timestamp_ms();
        let entry = CacheEntry::new(value, expires_at_from(now, ttl_seconds));

        self.store.admit(key, entry, now).await.inspect_err(|_| {
            warn!(
                "Cache is full ({} entries), rejected insert",
                self.config.max_size
            )
        })
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = current_timestamp_ms();
        self.store.purge_expired(now).await;

        // Re-check in case the entry expired between purge and lookup
        self.store
            .lookup(key)
            .await
            .filter(|entry| !entry.is_expired(now))
            .map(CacheEntry::into_value)
    }

    // == Remove ==
    /// Removes `key`. Removing a missing key is not an error.
    pub async fn remove(&self, key: &K) {
        self.store.delete(key).await;
    }

    // == Current Size ==
    /// Number of entries held right now.
    ///
    /// Informational only; may include entries that expired since the last
    /// purge.
    pub async fn current_size(&self) -> usize {
        self.store.size().await
    }

    // == Purge Expired ==
    /// Runs the same sweep as the reaper and returns how many entries it
    /// removed.
    pub async fn purge_expired(&self) -> usize {
        self.store.purge_expired(current_timestamp_ms()).await
    }

    // == Shutdown ==
    /// Stops the reaper and waits for it to exit.
    ///
    /// The cache stays usable afterwards; expired entries are then only
    /// reclaimed by inline purges. Calling it twice is a no-op.
    pub async fn shutdown(&self) {
        if let Some(reaper) = self.reaper.lock().await.take() {
            reaper.stop().await;
        }
    }

    pub fn max_size(&self) -> usize {
        self.config.max_size
    }

    pub fn global_timeout(&self) -> u64 {
        self.config.global_timeout
    }

    pub fn cleanup_interval(&self) -> u64 {
        self.config.cleanup_interval
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
