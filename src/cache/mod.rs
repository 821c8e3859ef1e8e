//! Cache Module
//!
//! Bounded in-memory caching with TTL expiration and admission control.

mod entry;
mod store;
mod ttl_cache;


// Re-export public types
pub use entry::{current_timestamp_ms, expires_at_from, CacheEntry};
pub use store::Store;
pub use ttl_cache::TtlCache;
