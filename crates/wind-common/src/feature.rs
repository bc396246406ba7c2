//! GeoJSON wind features.
//!
//! The backend emits, and the tile layer consumes, a GeoJSON
//! `FeatureCollection` of `Point` features whose properties carry the wind
//! speed in three units and the compass bearing the wind blows from:
//!
//! ```json
//! {"type": "Feature",
//!  "geometry": {"type": "Point", "coordinates": [-75.0, 35.0]},
//!  "properties": {"speed_kt": 15.5, "speed_mph": 17.8,
//!                 "speed_kmh": 28.7, "dir_from_deg": 270}}
//! ```

use serde::{Deserialize, Serialize};

use crate::bbox::LatLon;
use crate::units::{KT_TO_KMH, KT_TO_MPH};

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

/// A GeoJSON FeatureCollection of wind points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindFeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type", default = "feature_collection_type")]
    pub type_: String,

    #[serde(default)]
    pub features: Vec<WindFeature>,
}

impl WindFeatureCollection {
    pub fn new(features: Vec<WindFeature>) -> Self {
        Self {
            type_: feature_collection_type(),
            features,
        }
    }

    /// Create a new empty FeatureCollection.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Append another collection's features, keeping duplicates.
    pub fn merge(&mut self, other: WindFeatureCollection) {
        self.features.extend(other.features);
    }
}

impl Default for WindFeatureCollection {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<WindFeature> for WindFeatureCollection {
    fn from_iter<I: IntoIterator<Item = WindFeature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A single wind observation point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindFeature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type", default = "feature_type")]
    pub type_: String,

    pub geometry: WindGeometry,

    pub properties: WindProperties,
}

impl WindFeature {
    /// Create a point feature at `[lon, lat]`.
    pub fn point(lon: f64, lat: f64, properties: WindProperties) -> Self {
        Self {
            type_: feature_type(),
            geometry: WindGeometry::Point {
                coordinates: [lon, lat],
            },
            properties,
        }
    }

    pub fn lon(&self) -> f64 {
        match self.geometry {
            WindGeometry::Point { coordinates } => coordinates[0],
        }
    }

    pub fn lat(&self) -> f64 {
        match self.geometry {
            WindGeometry::Point { coordinates } => coordinates[1],
        }
    }

    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat(), self.lon())
    }

    /// Whether the feature can be drawn as a directional arrow.
    pub fn has_bearing(&self) -> bool {
        self.properties
            .dir_from_deg
            .map(|d| d.is_finite())
            .unwrap_or(false)
    }
}

/// GeoJSON geometry. Wind features are always points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WindGeometry {
    Point {
        /// Coordinates as [longitude, latitude].
        coordinates: [f64; 2],
    },
}

/// Wind speed and bearing for one point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct WindProperties {
    /// Speed in knots (primary unit).
    #[serde(default)]
    pub speed_kt: Option<f64>,

    #[serde(default)]
    pub speed_mph: Option<f64>,

    #[serde(default)]
    pub speed_kmh: Option<f64>,

    /// Compass bearing the wind blows from, in degrees.
    #[serde(default)]
    pub dir_from_deg: Option<f64>,
}

impl WindProperties {
    /// Build properties from a speed in knots, deriving mph and km/h.
    pub fn from_knots(speed_kt: f64, dir_from_deg: Option<f64>) -> Self {
        Self {
            speed_kt: Some(speed_kt),
            speed_mph: Some(speed_kt * KT_TO_MPH),
            speed_kmh: Some(speed_kt * KT_TO_KMH),
            dir_from_deg,
        }
    }
}
