//! Configuration Module
//!
//! Construction-time settings for a cache, loadable from environment
//! variables or any serde format.

use std::env;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::cache::TtlCache;
use crate::error::{ConfigError, ConfigResult};

/// Reaper period used when none is configured.
pub const DEFAULT_CLEANUP_INTERVAL: u64 = 3;

/// Cache configuration parameters.
///
/// Fixed at construction; the cache never changes them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub max_size: usize,
    /// Default TTL in seconds for `put` calls without an explicit TTL
    pub global_timeout: u64,
    /// Reaper sweep interval in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

fn default_cleanup_interval() -> u64 {
    DEFAULT_CLEANUP_INTERVAL
}

impl CacheConfig {
    /// Creates a config with the default cleanup interval.
    pub fn new(max_size: usize, global_timeout: u64) -> Self {
        Self {
            max_size,
            global_timeout,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_GLOBAL_TIMEOUT` - Default TTL in seconds (default: 300)
    /// - `CACHE_CLEANUP_INTERVAL` - Reaper frequency in seconds (default: 3)
    ///
    /// A variable that is set but not a number is an error, not a fallback.
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_size: env_or("CACHE_MAX_SIZE", defaults.max_size)?,
            global_timeout: env_or("CACHE_GLOBAL_TIMEOUT", defaults.global_timeout)?,
            cleanup_interval: env_or("CACHE_CLEANUP_INTERVAL", defaults.cleanup_interval)?,
        })
    }

    /// Checks the rules a cache enforces at construction.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_size == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.cleanup_interval == 0 {
            return Err(ConfigError::ZeroCleanupInterval);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            global_timeout: 300,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &'static str, default: T) -> ConfigResult<T> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar { name, value }),
        Err(_) => Ok(default),
    }
}

// == Cache Builder ==
/// Fluent construction of a [`TtlCache`].
///
/// ```ignore
/// let cache: TtlCache<String, String> = CacheBuilder::new(5, 2)
///     .cleanup_interval(1)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    config: CacheConfig,
}

impl CacheBuilder {
    pub fn new(max_size: usize, global_timeout: u64) -> Self {
        Self {
            config: CacheConfig::new(max_size, global_timeout),
        }
    }

    /// Overrides the reaper interval (default 3 seconds).
    pub fn cleanup_interval(mut self, seconds: u64) -> Self {
        self.config.cleanup_interval = seconds;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Builds the cache and starts its reaper.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build<K, V>(self) -> ConfigResult<TtlCache<K, V>>
    where
        K: Eq + Hash + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        TtlCache::new(self.config)
    }
}
