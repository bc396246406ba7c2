//! Geographic bounds and point types.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Kilometers per degree of latitude.
pub const KM_PER_DEG_LAT: f64 = 110.574;

/// Kilometers per degree of longitude at the equator.
pub const KM_PER_DEG_LON_EQUATOR: f64 = 111.320;

/// Below this cosine of latitude a longitude degree is treated as degenerate.
const MIN_COS_LAT: f64 = 1e-6;

/// Convert a north-south distance to degrees of latitude.
pub fn km_to_deg_lat(km: f64) -> f64 {
    km / KM_PER_DEG_LAT
}

/// Convert an east-west distance to degrees of longitude at `lat`.
///
/// Near the poles the conversion diverges; there the result is capped at a
/// full 360 degrees.
pub fn km_to_deg_lon(km: f64, lat: f64) -> f64 {
    let cos_lat = lat.to_radians().cos().abs();
    if cos_lat < MIN_COS_LAT {
        return 360.0;
    }
    (km / (KM_PER_DEG_LON_EQUATOR * cos_lat)).min(360.0)
}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to another point in kilometers.
    pub fn distance_km(&self, other: &LatLon) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// The visible extent of a map view, in degrees.
///
/// Longitudes are not wrapped; a view crossing the antimeridian is expected
/// to carry `east > 180`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl MapBounds {
    pub fn new(south: f64, north: f64, west: f64, east: f64) -> Self {
        Self {
            south,
            north,
            west,
            east,
        }
    }

    /// The East Coast region the map opens on (Florida to Maine, offshore).
    pub fn east_coast() -> Self {
        Self::new(24.0, 45.0, -82.0, -65.0)
    }

    /// True when all edges are finite and the box is not inverted.
    pub fn is_valid(&self) -> bool {
        [self.south, self.north, self.west, self.east]
            .iter()
            .all(|v| v.is_finite())
            && self.south <= self.north
            && self.west <= self.east
    }

    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Check if a point is contained within these bounds (edges inclusive).
    pub fn contains(&self, point: &LatLon) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }
}

/// Haversine great-circle distance between two points, in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center() {
        let bounds = MapBounds::east_coast();
        let center = bounds.center();
        assert_eq!(center.lat, 34.5);
        assert_eq!(center.lon, -73.5);
    }

    #[test]
    fn test_inverted_bounds_invalid() {
        assert!(MapBounds::new(24.0, 45.0, -82.0, -65.0).is_valid());
        assert!(!MapBounds::new(45.0, 24.0, -82.0, -65.0).is_valid());
        assert!(!MapBounds::new(f64::NAN, 45.0, -82.0, -65.0).is_valid());
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        // One degree of latitude is ~111.2 km on the mean sphere
        let d = haversine_km(40.0, -70.0, 41.0, -70.0);
        assert!((d - 111.195).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_km_to_deg() {
        assert!((km_to_deg_lat(110.574) - 1.0).abs() < 1e-12);
        assert!((km_to_deg_lon(111.320, 0.0) - 1.0).abs() < 1e-12);
        assert!((km_to_deg_lon(111.320, 60.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_km_to_deg_lon_at_pole() {
        assert_eq!(km_to_deg_lon(80.0, 90.0), 360.0);
        assert_eq!(km_to_deg_lon(80.0, -90.0), 360.0);
        assert!(km_to_deg_lon(80.0, 89.9999999).is_finite());
    }

    #[test]
    fn test_haversine_zero() {
        assert_eq!(haversine_km(40.0, -70.0, 40.0, -70.0), 0.0);
    }
}
