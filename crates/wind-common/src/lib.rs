//! Common types and utilities shared across the wind map crates.

pub mod bbox;
pub mod error;
pub mod feature;
pub mod time;
pub mod units;

pub use bbox::{haversine_km, km_to_deg_lat, km_to_deg_lon, LatLon, MapBounds};
pub use error::{WindError, WindResult};
pub use feature::{WindFeature, WindFeatureCollection, WindGeometry, WindProperties};
pub use time::{hour_key, ValidInterval};
pub use units::{to_knots, SpeedUnit};
