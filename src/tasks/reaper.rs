//! Reaper Task
//!
//! Background task that periodically removes expired cache entries, so
//! expired entries do not linger in a cache nobody is calling.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::cache::{current_timestamp_ms, Store};

/// Handle to a running reaper.
///
/// Dropping it also stops the loop (the stop channel closes), but only
/// [`Reaper::stop`] waits for the loop to exit.
#[derive(Debug)]
pub struct Reaper {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Reaper {
    /// Signals the loop to stop and waits until it has exited.
    ///
    /// A sweep that is already running finishes first; no sweep starts after
    /// this returns.
    pub async fn stop(self) {
        // The loop may already be gone, which is fine
        let _ = self.stop_tx.send(());
        if let Err(e) = self.handle.await {
            error!("Reaper task ended abnormally: {}", e);
        }
        info!("Reaper stopped");
    }

    /// Returns true once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns the reaper on the given runtime.
///
/// The first sweep fires one `interval` after start. Each sweep runs as its
/// own task so a panic inside it is logged and the schedule carries on.
///
/// # Arguments
/// * `runtime` - Runtime handle to spawn onto
/// * `store` - Store to sweep
/// * `interval` - Time between sweeps; must be non-zero
pub fn spawn_reaper<K, V>(runtime: &Handle, store: Arc<Store<K, V>>, interval: Duration) -> Reaper
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let sweeper = runtime.clone();

    let handle = runtime.spawn(async move {
        info!(
            "Starting reaper with interval of {} seconds",
            interval.as_secs()
        );

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Fires on an explicit stop and when the handle is dropped
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    let store = Arc::clone(&store);
                    let sweep = sweeper.spawn(async move {
                        store.purge_expired(current_timestamp_ms()).await
                    });

                    match sweep.await {
                        Ok(removed) if removed > 0 => {
                            info!("Reaper: removed {} expired entries", removed)
                        }
                        Ok(_) => debug!("Reaper: no expired entries found"),
                        Err(e) => error!("Reaper sweep failed, continuing: {}", e),
                    }
                }
            }
        }

        debug!("Reaper loop exited");
    });

    Reaper { stop_tx, handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheEntry;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn expired_entry<V>(value: V) -> CacheEntry<V> {
        CacheEntry::new(value, current_timestamp_ms() - 1_000)
    }

    fn live_entry<V>(value: V) -> CacheEntry<V> {
        CacheEntry::new(value, current_timestamp_ms() + 3_600_000)
    }

    #[tokio::test]
    async fn test_reaper_removes_expired_entries() {
        let store = Arc::new(Store::new(100));
        store
            .insert("expired".to_string(), expired_entry("value".to_string()))
            .await;

        let reaper = spawn_reaper(&Handle::current(), store.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(store.is_empty().await, "Expired entry should have been reaped");

        reaper.stop().await;
    }

    #[tokio::test]
    async fn test_reaper_preserves_valid_entries() {
        let store = Arc::new(Store::new(100));
        store
            .insert("long_lived".to_string(), live_entry("value".to_string()))
            .await;

        let reaper = spawn_reaper(&Handle::current(), store.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let found = store.lookup(&"long_lived".to_string()).await;
        assert_eq!(found.map(CacheEntry::into_value), Some("value".to_string()));

        reaper.stop().await;
    }

    #[tokio::test]
    async fn test_reaper_does_not_sweep_before_first_interval() {
        let store = Arc::new(Store::new(100));
        store
            .insert("expired".to_string(), expired_entry("value".to_string()))
            .await;

        let reaper = spawn_reaper(&Handle::current(), store.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.size().await, 1);

        reaper.stop().await;
    }

    #[tokio::test]
    async fn test_reaper_stop_is_final() {
        let store = Arc::new(Store::new(100));
        let reaper = spawn_reaper(&Handle::current(), store.clone(), Duration::from_secs(1));

        reaper.stop().await;

        store
            .insert("expired".to_string(), expired_entry("value".to_string()))
            .await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(store.size().await, 1, "No sweep may run after stop");
    }

    #[tokio::test]
    async fn test_reaper_exits_when_handle_dropped() {
        let store: Arc<Store<String, String>> = Arc::new(Store::new(100));
        let reaper = spawn_reaper(&Handle::current(), store.clone(), Duration::from_secs(1));
        let Reaper { stop_tx, handle } = reaper;

        drop(stop_tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("Reaper should exit once its stop channel closes")
            .unwrap();
    }

    /// Value whose drop panics the first time it is armed.
    struct Tripwire(Arc<AtomicBool>);

    impl Drop for Tripwire {
        fn drop(&mut self) {
            if self.0.swap(false, Ordering::SeqCst) {
                panic!("tripwire");
            }
        }
    }

    #[tokio::test]
    async fn test_reaper_survives_panicking_sweep() {
        let armed = Arc::new(AtomicBool::new(true));
        let store = Arc::new(Store::new(100));
        store
            .insert("a".to_string(), expired_entry(Tripwire(armed.clone())))
            .await;
        store
            .insert("b".to_string(), expired_entry(Tripwire(armed.clone())))
            .await;

        let reaper = spawn_reaper(&Handle::current(), store.clone(), Duration::from_secs(1));

        // First sweep panics part way through, the next one finishes the job
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!armed.load(Ordering::SeqCst));
        assert!(store.is_empty().await);
        assert!(!reaper.is_finished(), "Reaper must outlive a failed sweep");

        reaper.stop().await;
    }
}
