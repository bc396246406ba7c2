//! In-memory LRU cache with per-entry time-to-live.
//!
//! Used for the two upstream lookups that repeat across overlapping tiles:
//! point → forecast grid URL (stable for days) and grid URL → gridpoint
//! forecast (refreshed by NWS roughly hourly).
//!
//! ## Eviction Strategy
//! - Entry-count LRU eviction when capacity is exceeded
//! - TTL-based expiration on read (lazy)

use lru::LruCache;
use metrics::counter;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct CachedEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Statistics for a [`TtlCache`].
#[derive(Default)]
pub struct TtlCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    /// Entries dropped because their TTL passed.
    pub expired: AtomicU64,
    /// Entries pushed out by the capacity limit.
    pub evictions: AtomicU64,
}

impl TtlCacheStats {
    /// Cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

pub struct TtlCache<K, V> {
    name: &'static str,
    cache: Mutex<LruCache<K, CachedEntry<V>>>,
    ttl: Duration,
    stats: TtlCacheStats,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    /// `name` labels the cache in metrics.
    pub fn new(name: &'static str, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        tracing::info!(
            cache = name,
            capacity = capacity.get(),
            ttl_secs = ttl.as_secs(),
            "TtlCache initialized"
        );

        Self {
            name,
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
            stats: TtlCacheStats::default(),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.cache.lock().await;

        let found = cache
            .get(key)
            .map(|entry| (entry.inserted_at.elapsed() <= self.ttl, entry.value.clone()));

        let hit = match found {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                cache.pop(key);
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => None,
        };

        if hit.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            counter!("wind_api_cache_total", "cache" => self.name, "result" => "hit").increment(1);
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            counter!("wind_api_cache_total", "cache" => self.name, "result" => "miss").increment(1);
        }
        hit
    }

    pub async fn put(&self, key: K, value: V) {
        let entry = CachedEntry {
            value,
            inserted_at: Instant::now(),
        };

        let mut cache = self.cache.lock().await;
        let replaces = cache.contains(&key);
        if cache.push(key, entry).is_some() && !replaces {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub fn stats(&self) -> &TtlCacheStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_put_get() {
        let cache = TtlCache::new("test", 10, Duration::from_secs(300));

        cache.put("40.0000,-70.0000".to_string(), "https://grid/BOX/1,2".to_string()).await;

        let result = cache.get(&"40.0000,-70.0000".to_string()).await;
        assert_eq!(result.as_deref(), Some("https://grid/BOX/1,2"));
        assert_eq!(cache.stats().hits.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache: TtlCache<String, u32> = TtlCache::new("test", 10, Duration::from_secs(300));

        assert!(cache.get(&"unknown".to_string()).await.is_none());
        assert_eq!(cache.stats().misses.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let cache = TtlCache::new("test", 10, Duration::ZERO);

        cache.put(1u32, "value").await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(cache.get(&1).await.is_none());
        assert_eq!(cache.stats().expired.load(Ordering::Relaxed), 1);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let cache = TtlCache::new("test", 2, Duration::from_secs(300));

        cache.put(1u32, 'a').await;
        cache.put(2u32, 'b').await;
        cache.get(&1).await;
        cache.put(3u32, 'c').await;

        assert_eq!(cache.get(&1).await, Some('a'));
        assert!(cache.get(&2).await.is_none());
        assert_eq!(cache.stats().evictions.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_replacing_is_not_an_eviction() {
        let cache = TtlCache::new("test", 2, Duration::from_secs(300));

        cache.put(1u32, 'a').await;
        cache.put(1u32, 'b').await;

        assert_eq!(cache.get(&1).await, Some('b'));
        assert_eq!(cache.stats().evictions.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_hit_rate() {
        let cache = TtlCache::new("test", 10, Duration::from_secs(300));

        cache.get(&1u32).await;
        cache.put(1u32, ()).await;
        cache.get(&1).await;
        cache.get(&2).await;

        assert!((cache.stats().hit_rate() - 33.33).abs() < 1.0);
    }
}
