//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - Reaper: Removes expired cache entries at configured intervals

mod reaper;

pub use reaper::{spawn_reaper, Reaper};
