//! Overlay configuration.
//!
//! Every value has a compiled-in default; a YAML file may override any
//! subset of them:
//!
//! ```yaml
//! proxy_base_url: http://localhost:5055
//! tile_radius_km: 40
//! arrow_zoom: 9
//! palette_ramp: stepped
//! ```

use renderer::RampKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use wind_common::{MapBounds, WindError, WindResult};

/// Default backend base URL.
pub const DEFAULT_PROXY_BASE_URL: &str = "http://localhost:5055";

/// Where the overlay gets its features from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    /// Per-tile requests to the wind-grid endpoint, cached hourly.
    #[default]
    Tiles,
    /// One request to the ocean feed, falling back to test data.
    Feed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Backend adapter base URL.
    pub proxy_base_url: String,

    pub data_mode: DataMode,

    /// Side of one palette cell and spacing of backend sample points.
    pub cell_km: f64,

    /// Radius of one tile request.
    pub tile_radius_km: f64,

    /// Cap on sample points per tile, forwarded to the backend.
    pub max_cells: u32,

    /// Cap on tiles fetched for one view; the tiles nearest the view center
    /// are kept.
    pub max_tiles_per_view: usize,

    /// Arrows are drawn at this zoom level and above.
    pub arrow_zoom: u8,

    /// Speed at which both color ramps saturate.
    pub max_kt: f64,

    pub palette_ramp: RampKind,

    pub arrow_ramp: RampKind,

    pub initial_bounds: MapBounds,

    pub initial_zoom: u8,

    pub refresh_interval_secs: u64,

    /// Tile cache entries older than this many hours are evicted.
    pub cache_retain_hours: u32,

    pub request_timeout_secs: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            proxy_base_url: DEFAULT_PROXY_BASE_URL.to_string(),
            data_mode: DataMode::Tiles,
            cell_km: 10.0,
            tile_radius_km: 40.0,
            max_cells: 120,
            max_tiles_per_view: 400,
            arrow_zoom: 8,
            max_kt: 40.0,
            palette_ramp: RampKind::Interpolated,
            arrow_ramp: RampKind::Stepped,
            initial_bounds: MapBounds::east_coast(),
            initial_zoom: 6,
            refresh_interval_secs: 300,
            cache_retain_hours: 2,
            request_timeout_secs: 10,
        }
    }
}

impl OverlayConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> WindResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| WindError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> WindResult<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| WindError::Config(format!("Invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WindResult<()> {
        if !(self.cell_km.is_finite() && self.cell_km > 0.0) {
            return Err(WindError::Config("cell_km must be positive".to_string()));
        }
        if !(self.tile_radius_km.is_finite() && self.tile_radius_km > 0.0) {
            return Err(WindError::Config("tile_radius_km must be positive".to_string()));
        }
        if self.max_cells == 0 {
            return Err(WindError::Config("max_cells must be at least 1".to_string()));
        }
        if self.max_tiles_per_view == 0 {
            return Err(WindError::Config("max_tiles_per_view must be at least 1".to_string()));
        }
        if !(self.max_kt.is_finite() && self.max_kt > 0.0) {
            return Err(WindError::Config("max_kt must be positive".to_string()));
        }
        if !self.initial_bounds.is_valid() {
            return Err(WindError::Config("initial_bounds is inverted or non-finite".to_string()));
        }
        if self.refresh_interval_secs == 0 {
            return Err(WindError::Config("refresh_interval_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OverlayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tile_radius_km, 40.0);
        assert_eq!(config.cell_km, 10.0);
        assert_eq!(config.max_cells, 120);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = OverlayConfig::from_yaml("arrow_zoom: 10\npalette_ramp: stepped\n").unwrap();
        assert_eq!(config.arrow_zoom, 10);
        assert_eq!(config.palette_ramp, RampKind::Stepped);
        assert_eq!(config.max_cells, 120);
        assert_eq!(config.proxy_base_url, DEFAULT_PROXY_BASE_URL);
    }

    #[test]
    fn test_yaml_bounds_and_mode() {
        let yaml = r#"
data_mode: feed
initial_bounds:
  south: 30.0
  north: 40.0
  west: -80.0
  east: -70.0
"#;
        let config = OverlayConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.data_mode, DataMode::Feed);
        assert_eq!(config.initial_bounds, MapBounds::new(30.0, 40.0, -80.0, -70.0));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(OverlayConfig::from_yaml("cell_km: 0").is_err());
        assert!(OverlayConfig::from_yaml("max_cells: 0").is_err());
        assert!(OverlayConfig::from_yaml("max_tiles_per_view: 0").is_err());
        assert!(OverlayConfig::from_yaml("tile_radius_km: -4").is_err());
        assert!(OverlayConfig::from_yaml("arrow_zoom: [1, 2]").is_err());
    }

    #[test]
    fn test_zero_tile_cap_message() {
        let err = OverlayConfig::from_yaml("max_tiles_per_view: 0").unwrap_err();
        assert!(err.to_string().contains("max_tiles_per_view"));
    }
}
