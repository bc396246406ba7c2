//! Arrow glyph layer.
//!
//! Each wind point with a bearing becomes an arrow pointing downwind (the
//! direction the air is moving), colored by speed, with popup text giving
//! speed in all three units and the bearing the wind blows from.

use serde::Serialize;
use wind_common::{LatLon, WindFeature};

use crate::color::Color;
use crate::ramp::ColorRamp;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// A rotated arrow marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrowGlyph {
    pub position: LatLon,

    /// Bearing the wind blows from, normalized to [0, 360).
    pub dir_from_deg: f64,

    /// Clockwise rotation from north of the arrow head (downwind).
    pub rotation_deg: f64,

    pub color: Color,

    pub speed_kt: Option<f64>,

    pub popup: String,
}

impl ArrowGlyph {
    /// Build a glyph from a feature; `None` if the feature has no bearing.
    pub fn from_feature(feature: &WindFeature, ramp: &dyn ColorRamp) -> Option<Self> {
        let dir_from = normalize_bearing(feature.properties.dir_from_deg.filter(|d| d.is_finite())?);
        let speed = feature.properties.speed_kt;

        Some(Self {
            position: feature.position(),
            dir_from_deg: dir_from,
            rotation_deg: normalize_bearing(dir_from + 180.0),
            color: ramp.color_for_kt(speed),
            speed_kt: speed,
            popup: popup_text(feature, dir_from),
        })
    }

    /// Standalone SVG for this glyph, `size` pixels square, arrow drawn
    /// pointing north and rotated about the center.
    pub fn to_svg(&self, size: u32) -> String {
        let s = size as f64;
        let c = s / 2.0;
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {s} {s}"><g transform="rotate({rot:.1} {c} {c})"><line x1="{c}" y1="{tail:.1}" x2="{c}" y2="{head:.1}" stroke="{color}" stroke-width="{stroke:.1}"/><polygon points="{c},{tip:.1} {left:.1},{barb:.1} {right:.1},{barb:.1}" fill="{color}"/></g></svg>"#,
            size = size,
            s = s,
            c = c,
            rot = self.rotation_deg,
            tail = s * 0.9,
            head = s * 0.3,
            tip = s * 0.1,
            barb = s * 0.35,
            left = c - s * 0.15,
            right = c + s * 0.15,
            stroke = (s * 0.08).max(1.0),
            color = self.color.to_hex(),
        )
    }
}

/// Render arrow glyphs for every feature carrying a usable bearing.
pub fn render_arrows(features: &[WindFeature], ramp: &dyn ColorRamp) -> Vec<ArrowGlyph> {
    let arrows: Vec<ArrowGlyph> = features
        .iter()
        .filter_map(|f| ArrowGlyph::from_feature(f, ramp))
        .collect();

    tracing::debug!(
        features = features.len(),
        arrows = arrows.len(),
        skipped = features.len() - arrows.len(),
        "Rendered arrow layer"
    );
    arrows
}

/// Normalize a bearing to [0, 360).
pub fn normalize_bearing(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// 16-point compass name for a bearing.
pub fn cardinal(deg: f64) -> &'static str {
    let idx = ((normalize_bearing(deg) / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[idx]
}

fn popup_text(feature: &WindFeature, dir_from: f64) -> String {
    let p = &feature.properties;
    let speed = match (p.speed_kt, p.speed_mph, p.speed_kmh) {
        (Some(kt), Some(mph), Some(kmh)) => {
            format!("{:.1} kt ({:.1} mph, {:.1} km/h)", kt, mph, kmh)
        }
        (Some(kt), _, _) => format!("{:.1} kt", kt),
        _ => "Speed unavailable".to_string(),
    };
    format!("{}\nFrom {:.0}\u{00b0} ({})", speed, dir_from, cardinal(dir_from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_points() {
        assert_eq!(cardinal(0.0), "N");
        assert_eq!(cardinal(359.0), "N");
        assert_eq!(cardinal(90.0), "E");
        assert_eq!(cardinal(245.0), "WSW");
        assert_eq!(cardinal(270.0), "W");
        assert_eq!(cardinal(-90.0), "W");
    }

    #[test]
    fn test_normalize_bearing() {
        assert_eq!(normalize_bearing(450.0), 90.0);
        assert_eq!(normalize_bearing(-1e-20), 0.0);
        assert_eq!(normalize_bearing(360.0), 0.0);
    }
}
