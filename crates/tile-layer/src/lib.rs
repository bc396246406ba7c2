//! Client-side wind overlay pipeline.
//!
//! Computes which geographic tiles cover the current map view, fetches each
//! from the backend (deduplicated by an hourly tile cache), merges the
//! results and dispatches them to the palette and arrow renderers.

pub mod cache;
pub mod clock;
pub mod config;
pub mod fetcher;
pub mod geometry;
pub mod overlay;
pub mod source;

pub use cache::{TileCache, TileKey};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DataMode, OverlayConfig};
pub use fetcher::TileFetcher;
pub use geometry::{tile_centers_for_view, tile_centers_near_center, tile_step, TileCover, TileStep};
pub use overlay::{dispatch, merge_tiles, MapLayers, OverlayData, OverlayDriver, ViewState, WindOverlay};
pub use source::{
    FeatureEndpoint, FeedOrigin, FeedResult, FeedSource, HttpEndpoint, ProxyTileSource, TileRequest,
    TileSource,
};
