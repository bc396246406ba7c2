//! Network sources for wind features.
//!
//! [`FeatureEndpoint`] is the seam to the backend adapter: it turns a path
//! and query into a parsed `FeatureCollection`. Two consumers sit on top:
//!
//! - [`ProxyTileSource`] requests one tile from the wind-grid endpoint.
//! - [`FeedSource`] requests the whole ocean feed and falls back to the
//!   static test data when the primary endpoint fails.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use wind_common::{LatLon, WindError, WindFeatureCollection, WindResult};

use crate::config::OverlayConfig;

/// Path of the per-tile wind grid endpoint.
pub const WINDGRID_PATH: &str = "/nws/forecast/windgrid";

/// Path of the ocean-wide feed.
pub const OCEAN_FEED_PATH: &str = "/ocean-wind-data";

/// Path of the static fixture feed.
pub const TEST_FEED_PATH: &str = "/test-wind-data";

/// Fetches a GeoJSON feature collection from the backend.
#[async_trait]
pub trait FeatureEndpoint: Send + Sync {
    async fn get_features(&self, path: &str, query: &[(&str, String)]) -> WindResult<WindFeatureCollection>;
}

/// HTTP implementation of [`FeatureEndpoint`].
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: Client,
    base_url: String,
}

impl HttpEndpoint {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> WindResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WindError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FeatureEndpoint for HttpEndpoint {
    #[instrument(skip(self, query), fields(base = %self.base_url))]
    async fn get_features(&self, path: &str, query: &[(&str, String)]) -> WindResult<WindFeatureCollection> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| WindError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WindError::Upstream {
                status: status.as_u16(),
                url,
            });
        }

        let features = response
            .json::<WindFeatureCollection>()
            .await
            .map_err(|e| WindError::Decode(e.to_string()))?;

        debug!(url = %url, count = features.len(), "Fetched features");
        Ok(features)
    }
}

/// Parameters of one tile request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRequest {
    pub center: LatLon,
    pub radius_km: f64,
    pub cell_km: f64,
    pub max_cells: u32,
}

impl TileRequest {
    pub fn new(center: LatLon, config: &OverlayConfig) -> Self {
        Self {
            center,
            radius_km: config.tile_radius_km,
            cell_km: config.cell_km,
            max_cells: config.max_cells,
        }
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("centerLat", format!("{:.2}", self.center.lat)),
            ("centerLon", format!("{:.2}", self.center.lon)),
            ("radiusKm", self.radius_km.to_string()),
            ("cellKm", self.cell_km.to_string()),
            ("maxCells", self.max_cells.to_string()),
        ]
    }
}

/// Fetches the features covering one tile.
#[async_trait]
pub trait TileSource: Send + Sync {
    async fn fetch_tile(&self, request: &TileRequest) -> WindResult<WindFeatureCollection>;
}

/// Tile source backed by the wind-grid endpoint.
#[derive(Clone)]
pub struct ProxyTileSource {
    endpoint: Arc<dyn FeatureEndpoint>,
}

impl ProxyTileSource {
    pub fn new(endpoint: Arc<dyn FeatureEndpoint>) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl TileSource for ProxyTileSource {
    async fn fetch_tile(&self, request: &TileRequest) -> WindResult<WindFeatureCollection> {
        self.endpoint
            .get_features(WINDGRID_PATH, &request.query_params())
            .await
    }
}

/// Which endpoint produced a feed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOrigin {
    Primary,
    Fallback,
    /// Both endpoints failed; the features are empty.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedResult {
    pub origin: FeedOrigin,
    pub features: WindFeatureCollection,
}

/// Ocean-wide feed with fallback to the fixture endpoint.
#[derive(Clone)]
pub struct FeedSource {
    endpoint: Arc<dyn FeatureEndpoint>,
}

impl FeedSource {
    pub fn new(endpoint: Arc<dyn FeatureEndpoint>) -> Self {
        Self { endpoint }
    }

    /// Fetch the feed. Never fails: a primary failure falls back to the test
    /// data and a double failure yields an empty collection.
    pub async fn fetch_feed(&self) -> FeedResult {
        match self.endpoint.get_features(OCEAN_FEED_PATH, &[]).await {
            Ok(features) => {
                return FeedResult {
                    origin: FeedOrigin::Primary,
                    features,
                }
            }
            Err(e) => warn!(error = %e, "Ocean wind feed failed, falling back to test data"),
        }

        match self.endpoint.get_features(TEST_FEED_PATH, &[]).await {
            Ok(features) => FeedResult {
                origin: FeedOrigin::Fallback,
                features,
            },
            Err(e) => {
                warn!(error = %e, "Test wind feed failed, rendering no wind data");
                FeedResult {
                    origin: FeedOrigin::Unavailable,
                    features: WindFeatureCollection::empty(),
                }
            }
        }
    }
}
