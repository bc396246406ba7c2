//! Hourly tile cache.
//!
//! Entries are keyed by tile center rounded to two decimal degrees plus the
//! UTC hour the request was made in. An entry is written once and never
//! refetched under the same key; once the hour rolls over, requests use a new
//! key. When a newer hour is first inserted, entries older than the
//! retention window are evicted so a long session does not grow without
//! bound.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;
use wind_common::{hour_key, time::truncate_to_hour, LatLon, WindFeatureCollection};

/// Cache key: rounded tile center and hour.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    /// Latitude in hundredths of a degree.
    lat_centi: i64,
    /// Longitude in hundredths of a degree.
    lon_centi: i64,
    hour: String,
}

impl TileKey {
    pub fn new(center: &LatLon, now: DateTime<Utc>) -> Self {
        Self {
            lat_centi: to_centi(center.lat),
            lon_centi: to_centi(center.lon),
            hour: hour_key(now),
        }
    }

    /// The rounded tile center this key refers to.
    pub fn center(&self) -> LatLon {
        LatLon::new(self.lat_centi as f64 / 100.0, self.lon_centi as f64 / 100.0)
    }

    pub fn hour(&self) -> &str {
        &self.hour
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let center = self.center();
        write!(f, "{:.2},{:.2}|{}", center.lat, center.lon, self.hour)
    }
}

fn to_centi(deg: f64) -> i64 {
    (deg * 100.0).round() as i64
}

/// Round a coordinate to two decimal degrees.
pub fn round_center(center: &LatLon) -> LatLon {
    LatLon::new(
        to_centi(center.lat) as f64 / 100.0,
        to_centi(center.lon) as f64 / 100.0,
    )
}

struct CachedTile {
    features: Arc<WindFeatureCollection>,
    hour_start: DateTime<Utc>,
}

/// Statistics for the tile cache.
#[derive(Debug, Default)]
pub struct TileCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
}

impl TileCacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

/// Write-once map from [`TileKey`] to the features fetched for it.
pub struct TileCache {
    entries: HashMap<TileKey, CachedTile>,
    retain: Duration,
    newest_hour: Option<DateTime<Utc>>,
    stats: TileCacheStats,
}

impl TileCache {
    /// Create a cache keeping entries from the newest `retain_hours` hours
    /// (at least the current one).
    pub fn new(retain_hours: u32) -> Self {
        Self {
            entries: HashMap::new(),
            retain: Duration::hours(retain_hours.max(1) as i64),
            newest_hour: None,
            stats: TileCacheStats::default(),
        }
    }

    pub fn get(&self, key: &TileKey) -> Option<Arc<WindFeatureCollection>> {
        match self.entries.get(key) {
            Some(entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.features))
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert features for `key`, fetched at `fetched_at`.
    ///
    /// An existing entry is kept as is; the returned collection is whichever
    /// is stored under the key afterwards.
    pub fn insert(
        &mut self,
        key: TileKey,
        fetched_at: DateTime<Utc>,
        features: Arc<WindFeatureCollection>,
    ) -> Arc<WindFeatureCollection> {
        let hour_start = truncate_to_hour(fetched_at);

        let stored = Arc::clone(
            &self
                .entries
                .entry(key)
                .or_insert(CachedTile {
                    features,
                    hour_start,
                })
                .features,
        );

        if self.newest_hour.map_or(true, |newest| hour_start > newest) {
            self.newest_hour = Some(hour_start);
            self.evict_before(hour_start - self.retain + Duration::hours(1));
        }

        stored
    }

    /// Drop every entry whose hour started before `cutoff`.
    fn evict_before(&mut self, cutoff: DateTime<Utc>) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.hour_start >= cutoff);
        let evicted = before - self.entries.len();

        if evicted > 0 {
            self.stats.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
            debug!(evicted, remaining = self.entries.len(), "Evicted stale tile cache entries");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &TileCacheStats {
        &self.stats
    }
}
