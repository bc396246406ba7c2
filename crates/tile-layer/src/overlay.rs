//! Merge, render dispatch and the refresh driver.
//!
//! One refresh run computes the visible tiles, fetches all of them
//! concurrently, waits for every fetch, merges the features and renders the
//! palette layer (always) and the arrow layer (zoomed in only). Runs are
//! numbered; the published layers are only replaced by a run newer than the
//! one that produced them, so a slow run finishing after a faster, newer one
//! is discarded.

use futures::future::join_all;
use renderer::{render_arrows, render_palette, ArrowGlyph, ColorRamp, PaletteCell};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use wind_common::{LatLon, MapBounds, WindFeature, WindFeatureCollection, WindResult};

use crate::cache::TileCache;
use crate::clock::{Clock, SystemClock};
use crate::config::{DataMode, OverlayConfig};
use crate::fetcher::TileFetcher;
use crate::geometry::tile_centers_near_center;
use crate::source::{FeatureEndpoint, FeedSource, HttpEndpoint, ProxyTileSource, TileSource};

/// The current map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub bounds: MapBounds,
    pub center: LatLon,
    pub zoom: u8,
}

impl ViewState {
    /// A view of `bounds` centered on their midpoint.
    pub fn new(bounds: MapBounds, zoom: u8) -> Self {
        Self {
            bounds,
            center: bounds.center(),
            zoom,
        }
    }

    pub fn initial(config: &OverlayConfig) -> Self {
        Self::new(config.initial_bounds, config.initial_zoom)
    }
}

/// Rendered overlay layers handed to the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapLayers {
    /// Refresh run that produced these layers (0 = nothing rendered yet).
    pub generation: u64,
    pub zoom: u8,
    pub feature_count: usize,
    pub palette: Vec<PaletteCell>,
    /// Empty whenever the zoom is below the arrow threshold.
    pub arrows: Vec<ArrowGlyph>,
}

/// Concatenate tile results in order.
///
/// Overlapping tiles may contribute the same point more than once; no
/// coordinate deduplication is done.
pub fn merge_tiles(tiles: &[Arc<WindFeatureCollection>]) -> Vec<WindFeature> {
    tiles
        .iter()
        .flat_map(|tile| tile.features.iter().cloned())
        .collect()
}

/// Render the palette layer, plus arrows when `zoom >= arrow_zoom`.
pub fn dispatch(
    features: &[WindFeature],
    zoom: u8,
    config: &OverlayConfig,
    palette_ramp: &dyn ColorRamp,
    arrow_ramp: &dyn ColorRamp,
) -> (Vec<PaletteCell>, Vec<ArrowGlyph>) {
    let palette = render_palette(features, config.cell_km, palette_ramp);
    let arrows = if zoom >= config.arrow_zoom {
        render_arrows(features, arrow_ramp)
    } else {
        Vec::new()
    };
    (palette, arrows)
}

/// Where an overlay gets its features.
pub enum OverlayData {
    Tiles(TileFetcher),
    Feed(FeedSource),
}

/// The wind overlay: owns the fetch pipeline and the published layers.
pub struct WindOverlay {
    config: OverlayConfig,
    data: OverlayData,
    palette_ramp: Box<dyn ColorRamp>,
    arrow_ramp: Box<dyn ColorRamp>,
    next_generation: AtomicU64,
    layers: watch::Sender<Arc<MapLayers>>,
}

impl WindOverlay {
    pub fn new(config: OverlayConfig, data: OverlayData) -> Self {
        let (layers, _) = watch::channel(Arc::new(MapLayers::default()));
        Self {
            palette_ramp: config.palette_ramp.build(config.max_kt),
            arrow_ramp: config.arrow_ramp.build(config.max_kt),
            config,
            data,
            next_generation: AtomicU64::new(0),
            layers,
        }
    }

    /// Tile-mode overlay over an arbitrary source, with a fresh cache.
    pub fn with_tile_source(config: OverlayConfig, source: Arc<dyn TileSource>, clock: Arc<dyn Clock>) -> Self {
        let cache = Arc::new(RwLock::new(TileCache::new(config.cache_retain_hours)));
        let fetcher = TileFetcher::new(source, cache, clock, config.clone());
        Self::new(config, OverlayData::Tiles(fetcher))
    }

    /// Overlay talking HTTP to the configured backend.
    pub fn from_config(config: OverlayConfig) -> WindResult<Self> {
        let endpoint: Arc<dyn FeatureEndpoint> = Arc::new(HttpEndpoint::new(
            config.proxy_base_url.clone(),
            config.request_timeout(),
        )?);

        Ok(match config.data_mode {
            DataMode::Tiles => Self::with_tile_source(
                config,
                Arc::new(ProxyTileSource::new(endpoint)),
                Arc::new(SystemClock),
            ),
            DataMode::Feed => Self::new(config, OverlayData::Feed(FeedSource::new(endpoint))),
        })
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// The most recently published layers.
    pub fn layers(&self) -> Arc<MapLayers> {
        Arc::clone(&*self.layers.borrow())
    }

    /// Receive every newly published set of layers.
    pub fn subscribe(&self) -> watch::Receiver<Arc<MapLayers>> {
        self.layers.subscribe()
    }

    /// Run the fetch-merge-render pipeline for `view` and publish the result
    /// unless a newer run already has. Returns the published layers.
    pub async fn refresh(&self, view: &ViewState) -> Arc<MapLayers> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let features = match &self.data {
            OverlayData::Tiles(fetcher) => self.fetch_tiles(fetcher, view).await,
            OverlayData::Feed(feed) => {
                let result = feed.fetch_feed().await;
                debug!(origin = ?result.origin, count = result.features.len(), "Fetched feed");
                result.features.features
            }
        };

        let (palette, arrows) = dispatch(
            &features,
            view.zoom,
            &self.config,
            self.palette_ramp.as_ref(),
            self.arrow_ramp.as_ref(),
        );

        let rendered = Arc::new(MapLayers {
            generation,
            zoom: view.zoom,
            feature_count: features.len(),
            palette,
            arrows,
        });

        let applied = self.layers.send_if_modified(|current| {
            if generation > current.generation {
                *current = Arc::clone(&rendered);
                true
            } else {
                false
            }
        });

        if applied {
            info!(
                generation,
                zoom = view.zoom,
                features = rendered.feature_count,
                arrows = rendered.arrows.len(),
                "Rendered wind overlay"
            );
        } else {
            debug!(generation, "Discarding render superseded by a newer run");
        }

        self.layers()
    }

    async fn fetch_tiles(&self, fetcher: &TileFetcher, view: &ViewState) -> Vec<WindFeature> {
        let cover = tile_centers_near_center(
            &view.bounds,
            &view.center,
            self.config.tile_radius_km,
            self.config.max_tiles_per_view,
        );

        if cover.is_truncated() {
            warn!(
                tiles = cover.needed,
                limit = self.config.max_tiles_per_view,
                "View needs too many tiles, keeping those nearest the center"
            );
        }

        let tiles = join_all(cover.centers.iter().map(|center| fetcher.fetch(*center))).await;
        merge_tiles(&tiles)
    }
}

/// Re-runs the overlay on startup, on every view change and on a fixed
/// interval.
pub struct OverlayDriver {
    overlay: Arc<WindOverlay>,
    refresh_interval: Duration,
}

impl OverlayDriver {
    pub fn new(overlay: Arc<WindOverlay>) -> Self {
        let refresh_interval = overlay.config().refresh_interval();
        Self {
            overlay,
            refresh_interval,
        }
    }

    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Drive the overlay until the view channel closes, then wait for
    /// in-flight runs to finish.
    pub async fn run(self, mut views: watch::Receiver<ViewState>) {
        info!(
            refresh_interval_secs = self.refresh_interval.as_secs(),
            "Wind overlay driver started"
        );

        // The first tick completes immediately: that is the startup render
        let mut ticker = interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut runs = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let view = *views.borrow();
                    self.spawn_refresh(&mut runs, view);
                }
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = *views.borrow_and_update();
                    self.spawn_refresh(&mut runs, view);
                }
                Some(_) = runs.join_next(), if !runs.is_empty() => {}
            }
        }

        while runs.join_next().await.is_some() {}
        info!("Wind overlay driver stopped");
    }

    fn spawn_refresh(&self, runs: &mut JoinSet<()>, view: ViewState) {
        let overlay = Arc::clone(&self.overlay);
        runs.spawn(async move {
            overlay.refresh(&view).await;
        });
    }
}
