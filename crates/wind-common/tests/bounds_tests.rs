//! Tests for map bounds and distance helpers.

use wind_common::{haversine_km, LatLon, MapBounds};

#[test]
fn test_east_coast_contains_outer_banks() {
    let bounds = MapBounds::east_coast();
    assert!(bounds.contains(&LatLon::new(35.25, -75.5)));
    assert!(!bounds.contains(&LatLon::new(35.25, -60.0)));
}

#[test]
fn test_contains_edges_inclusive() {
    let bounds = MapBounds::new(24.0, 45.0, -82.0, -65.0);
    assert!(bounds.contains(&LatLon::new(24.0, -82.0)));
    assert!(bounds.contains(&LatLon::new(45.0, -65.0)));
}

#[test]
fn test_distance_symmetric() {
    let a = LatLon::new(40.0, -70.0);
    let b = LatLon::new(40.3, -69.6);
    assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-9);
}

#[test]
fn test_longitude_degree_shrinks_with_latitude() {
    let at_equator = haversine_km(0.0, 0.0, 0.0, 1.0);
    let at_forty = haversine_km(40.0, 0.0, 40.0, 1.0);
    assert!(at_forty < at_equator);
    assert!((at_forty / at_equator - 40f64.to_radians().cos()).abs() < 1e-3);
}
