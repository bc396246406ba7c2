//! Palette layer: one filled square per wind point, colored by speed.

use serde::Serialize;
use wind_common::{km_to_deg_lat, km_to_deg_lon, LatLon, WindFeature};

use crate::color::Color;
use crate::ramp::ColorRamp;

/// A filled square polygon centered on a wind point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteCell {
    pub center: LatLon,

    /// Closed exterior ring as `[lon, lat]` pairs (first == last), counter-
    /// clockwise from the south-west corner.
    pub ring: Vec<[f64; 2]>,

    pub color: Color,

    pub speed_kt: Option<f64>,
}

impl PaletteCell {
    /// Build the cell square of side `cell_km` around `center`.
    pub fn square(center: LatLon, cell_km: f64, color: Color, speed_kt: Option<f64>) -> Self {
        let half_lat = km_to_deg_lat(cell_km / 2.0);
        let half_lon = km_to_deg_lon(cell_km / 2.0, center.lat);

        let (s, n) = (center.lat - half_lat, center.lat + half_lat);
        let (w, e) = (center.lon - half_lon, center.lon + half_lon);

        Self {
            center,
            ring: vec![[w, s], [e, s], [e, n], [w, n], [w, s]],
            color,
            speed_kt,
        }
    }
}

/// Render every feature as a palette cell.
///
/// Features without a speed still get a cell in the ramp's gray sentinel;
/// features with non-finite coordinates are skipped.
pub fn render_palette(features: &[WindFeature], cell_km: f64, ramp: &dyn ColorRamp) -> Vec<PaletteCell> {
    let cells: Vec<PaletteCell> = features
        .iter()
        .filter(|f| f.position().is_finite())
        .map(|f| {
            let speed = f.properties.speed_kt;
            PaletteCell::square(f.position(), cell_km, ramp.color_for_kt(speed), speed)
        })
        .collect();

    tracing::debug!(
        features = features.len(),
        cells = cells.len(),
        "Rendered palette layer"
    );
    cells
}
