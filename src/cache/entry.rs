//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with an absolute expiry.

use chrono::Utc;

// == Cache Entry ==
/// A stored value paired with the instant after which it is expired.
///
/// Entries are immutable: replacing a key builds a fresh entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    value: V,
    /// Expiration timestamp (Unix milliseconds)
    expires_at: i64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry from an already-resolved expiry timestamp.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `expires_at` - Absolute expiry in Unix milliseconds
    pub fn new(value: V, expires_at: i64) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: the entry is still valid at the exact expiry
    /// instant and only expires once `now` is strictly past it.
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }

    /// Returns the expiration timestamp in Unix milliseconds.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Resolves a relative TTL into an absolute expiry timestamp.
///
/// Saturates instead of overflowing for absurdly large TTLs.
pub fn expires_at_from(now: i64, ttl_seconds: u64) -> i64 {
    let ttl_ms = i64::try_from(ttl_seconds)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    now.saturating_add(ttl_ms)
}
