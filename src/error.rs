//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Config Error Enum ==
/// Fatal errors raised while constructing a cache.
///
/// A cache is never handed out in a degraded state: any of these aborts
/// construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity must allow at least one entry
    #[error("Invalid configuration: max size must be greater than 0")]
    ZeroCapacity,

    /// The reaper cannot tick with a zero period
    #[error("Invalid configuration: cleanup interval must be at least 1 second")]
    ZeroCleanupInterval,

    /// An environment variable held something other than a number
    #[error("Invalid configuration: {name}={value:?} is not a valid number")]
    InvalidEnvVar { name: &'static str, value: String },

    /// The reaper needs a tokio runtime to be spawned on
    #[error("Invalid configuration: no tokio runtime available to host the reaper")]
    NoRuntime,
}

// == Overflow Error ==
/// Returned by `put` when the cache is at capacity.
///
/// Carries the rejected key so the caller can retry, `remove` something,
/// or drop the value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cache is full, unable to add key {key:?}")]
pub struct OverflowError<K> {
    key: K,
}

impl<K> OverflowError<K> {
    pub(crate) fn new(key: K) -> Self {
        Self { key }
    }

    /// The key whose insertion was rejected.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes the rejected key back.
    pub fn into_key(self) -> K {
        self.key
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
