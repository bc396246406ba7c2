//! Tile fetch-or-cache.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use chrono::{DateTime, Utc};
use wind_common::{LatLon, WindFeatureCollection};

use crate::cache::{round_center, TileCache, TileKey};
use crate::clock::Clock;
use crate::config::OverlayConfig;
use crate::source::{TileRequest, TileSource};

/// Returns the features for a tile, from cache when the current hour already
/// has them, otherwise from the [`TileSource`].
///
/// Concurrent fetches of the same tile and hour share one upstream request.
/// Failures degrade to an empty collection: they are logged, not cached and
/// not retried.
pub struct TileFetcher {
    source: Arc<dyn TileSource>,
    cache: Arc<RwLock<TileCache>>,
    clock: Arc<dyn Clock>,
    config: OverlayConfig,
    in_flight: Arc<Mutex<HashMap<TileKey, TileFlight>>>,
}

type TileFlight = Shared<BoxFuture<'static, Arc<WindFeatureCollection>>>;

impl TileFetcher {
    pub fn new(
        source: Arc<dyn TileSource>,
        cache: Arc<RwLock<TileCache>>,
        clock: Arc<dyn Clock>,
        config: OverlayConfig,
    ) -> Self {
        Self {
            source,
            cache,
            clock,
            config,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn fetch(&self, center: LatLon) -> Arc<WindFeatureCollection> {
        let now = self.clock.now();
        let key = TileKey::new(&center, now);

        if let Some(hit) = self.cache.read().await.get(&key) {
            debug!(tile = %key, "Tile cache hit");
            return hit;
        }

        let flight = {
            let mut in_flight = self.in_flight.lock().await;

            // A flight may have landed between the first lookup and the lock
            if let Some(hit) = self.cache.read().await.get(&key) {
                debug!(tile = %key, "Tile cache hit");
                return hit;
            }

            match in_flight.get(&key) {
                Some(flight) => {
                    debug!(tile = %key, "Joining in-flight tile request");
                    flight.clone()
                }
                None => {
                    let flight = self.start_flight(key.clone(), center, now);
                    in_flight.insert(key, flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    /// Fetch one tile, cache it on success, then clear its in-flight entry.
    fn start_flight(&self, key: TileKey, center: LatLon, now: DateTime<Utc>) -> TileFlight {
        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);
        let request = TileRequest::new(round_center(&center), &self.config);

        async move {
            // The cache lock is not held across the network call
            let features = match source.fetch_tile(&request).await {
                Ok(features) => {
                    debug!(tile = %key, count = features.len(), "Fetched tile");
                    cache.write().await.insert(key.clone(), now, Arc::new(features))
                }
                Err(e) => {
                    warn!(tile = %key, error = %e, "Tile fetch failed, using empty tile");
                    Arc::new(WindFeatureCollection::empty())
                }
            };
            in_flight.lock().await.remove(&key);
            features
        }
        .boxed()
        .shared()
    }

    /// Number of tile requests currently awaiting the source.
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    pub fn cache(&self) -> &Arc<RwLock<TileCache>> {
        &self.cache
    }
}
