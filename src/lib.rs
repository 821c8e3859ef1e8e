//! Bounded Cache - A bounded in-process key-value cache
//!
//! Provides TTL expiration, a cache-wide default timeout and strict
//! admission control: a full cache rejects new keys instead of evicting.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::TtlCache;
pub use config::{CacheBuilder, CacheConfig};
pub use error::{ConfigError, OverflowError};
