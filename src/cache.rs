//! Time-bounded cache for remote schema lookups.
//!
//! Avoids redundant round-trips during a burst of builds against the same
//! namespace. Entries expire a fixed TTL after `set`; expiry is always
//! enforced lazily on `get`, and active mode additionally runs a sweeper
//! task that reclaims expired entries proactively.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Cache operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// A background task sweeps expired entries on an interval.
    ///
    /// Must be constructed inside a tokio runtime.
    Active,
    /// Expiry is checked only lazily on `get`; no background work.
    Passive,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// A TTL cache safe for concurrent `get`/`set` from many in-flight
/// builds.
///
/// A miss-then-fetch race between two builds may cause a redundant remote
/// fetch, but entries are only ever replaced whole: `get` never observes
/// a partially written value.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
    ttl: Duration,
    stopped: Arc<AtomicBool>,
    sweeper: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl<V: Clone + Send + 'static> TtlCache<V> {
    /// Create a cache with the given TTL and mode.
    pub fn new(ttl: Duration, mode: CacheMode) -> Self {
        let entries: Arc<Mutex<HashMap<String, CacheEntry<V>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let stopped = Arc::new(AtomicBool::new(false));

        let sweeper = match mode {
            CacheMode::Passive => None,
            CacheMode::Active => {
                let entries = Arc::clone(&entries);
                let stopped = Arc::clone(&stopped);
                // Sweeping at half the TTL keeps the worst-case lifetime
                // of an expired entry bounded without busy-waiting.
                let interval = (ttl / 2).max(Duration::from_millis(100));
                Some(tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(interval);
                    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                    loop {
                        ticker.tick().await;
                        if stopped.load(Ordering::SeqCst) {
                            break;
                        }
                        let now = Instant::now();
                        let mut map = entries.lock().expect("cache lock poisoned");
                        map.retain(|_, entry| entry.expires_at > now);
                    }
                }))
            }
        };

        Self {
            entries,
            ttl,
            stopped,
            sweeper: Mutex::new(sweeper),
        }
    }

    /// Look up a live entry.
    ///
    /// An entry past its TTL is reported absent even if the sweeper has
    /// not reclaimed it yet (or never will, in passive mode).
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut map = self.entries.lock().expect("cache lock poisoned");
        match map.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or refresh an entry; visible immediately regardless of
    /// sweep timing.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        let mut map = self.entries.lock().expect("cache lock poisoned");
        map.insert(key.into(), entry);
    }

    /// Number of live entries (expired-but-unswept entries excluded).
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let map = self.entries.lock().expect("cache lock poisoned");
        map.values().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop the sweeper task, if any.
    ///
    /// Idempotent, safe to call with nothing cached, and guarantees no
    /// sweep fires after it returns.
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let mut sweeper = self.sweeper.lock().expect("sweeper lock poisoned");
        if let Some(handle) = sweeper.take() {
            handle.abort();
        }
    }
}

impl<V> Drop for TtlCache<V> {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Ok(mut sweeper) = self.sweeper.lock() {
            if let Some(handle) = sweeper.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_set_then_get() {
        let cache: TtlCache<String> = TtlCache::new(TTL, CacheMode::Passive);
        cache.set("k", "v".to_string());
        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_without_sweep() {
        let cache: TtlCache<u32> = TtlCache::new(TTL, CacheMode::Passive);
        cache.set("k", 1);

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(cache.get("k"), Some(1));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_after_expiry_is_visible() {
        let cache: TtlCache<u32> = TtlCache::new(TTL, CacheMode::Passive);
        cache.set("k", 1);
        tokio::time::advance(TTL * 2).await;
        assert_eq!(cache.get("k"), None);

        cache.set("k", 2);
        assert_eq!(cache.get("k"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_sweep_reclaims_entries() {
        let cache: TtlCache<u32> = TtlCache::new(TTL, CacheMode::Active);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.len(), 2);

        // Past the TTL and at least one sweep interval
        tokio::time::advance(TTL + TTL / 2).await;
        tokio::task::yield_now().await;

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 0);
        cache.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_is_idempotent() {
        let cache: TtlCache<u32> = TtlCache::new(TTL, CacheMode::Active);
        cache.shutdown();
        cache.shutdown();

        // Still usable as a passive cache after shutdown
        cache.set("k", 1);
        assert_eq!(cache.get("k"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_with_nothing_cached() {
        let cache: TtlCache<u32> = TtlCache::new(TTL, CacheMode::Passive);
        cache.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_extends_expiry() {
        let cache: TtlCache<u32> = TtlCache::new(TTL, CacheMode::Passive);
        cache.set("k", 1);
        tokio::time::advance(TTL / 2).await;
        cache.set("k", 2);
        tokio::time::advance((TTL / 4) * 3).await;
        // Original entry would have expired; refreshed one has not
        assert_eq!(cache.get("k"), Some(2));
    }
}
