//! Wind data handlers.
//!
//! All three endpoints answer with a GeoJSON `FeatureCollection` of wind
//! points carrying `speed_kt`, `speed_mph`, `speed_kmh` and `dir_from_deg`.

use axum::{extract::Extension, extract::Query, Json};
use futures::stream::{self, StreamExt};
use metrics::counter;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use wind_common::{LatLon, MapBounds, WindError, WindFeature, WindFeatureCollection, WindProperties, WindResult};

use crate::error::ApiResult;
use crate::grid::{grid_cells, ocean_feed_points, ocean_grid, GridRequest, OCEAN_GRID_SPACING_KM};
use crate::state::AppState;

/// Look up the current wind at each point, at most
/// `state.upstream_concurrency` at a time, keeping input order. Points
/// without a known speed, or whose lookup failed, are left out.
pub async fn lookup_features(state: &AppState, points: Vec<LatLon>) -> WindFeatureCollection {
    let lookup = Arc::clone(&state.lookup);
    let requested = points.len();

    let results: Vec<(LatLon, WindResult<_>)> = stream::iter(points)
        .map(|point| {
            let lookup = Arc::clone(&lookup);
            async move { (point, lookup.current_wind(point).await) }
        })
        .buffered(state.upstream_concurrency)
        .collect()
        .await;

    let mut failures = 0usize;
    let features: WindFeatureCollection = results
        .into_iter()
        .filter_map(|(point, result)| match result {
            Ok(Some(wind)) => Some(WindFeature::point(
                point.lon,
                point.lat,
                WindProperties::from_knots(wind.speed_kt, wind.dir_from_deg),
            )),
            Ok(None) => None,
            Err(e) => {
                failures += 1;
                warn!(lat = point.lat, lon = point.lon, error = %e, "Wind lookup failed");
                None
            }
        })
        .collect();

    info!(requested, returned = features.len(), failures, "Looked up wind points");
    features
}

/// GET /ocean-wind-data
#[instrument(skip(state))]
pub async fn ocean_wind_handler(Extension(state): Extension<Arc<AppState>>) -> Json<WindFeatureCollection> {
    counter!("wind_api_requests_total", "endpoint" => "ocean-wind-data").increment(1);

    let grid = ocean_grid(&MapBounds::east_coast(), OCEAN_GRID_SPACING_KM);
    let points = ocean_feed_points(&grid);

    Json(lookup_features(&state, points).await)
}

/// GET /test-wind-data
pub async fn test_wind_handler() -> Json<WindFeatureCollection> {
    counter!("wind_api_requests_total", "endpoint" => "test-wind-data").increment(1);
    Json(test_wind_data())
}

/// Two fixed offshore observations.
pub fn test_wind_data() -> WindFeatureCollection {
    let fixed = |lon: f64, lat: f64, kt: f64, dir: f64, mph: f64, kmh: f64| {
        WindFeature::point(
            lon,
            lat,
            WindProperties {
                speed_kt: Some(kt),
                speed_mph: Some(mph),
                speed_kmh: Some(kmh),
                dir_from_deg: Some(dir),
            },
        )
    };

    WindFeatureCollection::new(vec![
        fixed(-75.0, 35.0, 15.5, 270.0, 17.8, 28.7),
        fixed(-74.0, 36.0, 22.3, 245.0, 25.7, 41.3),
    ])
}

/// Raw wind-grid query. Values stay strings so malformed numbers become
/// JSON errors rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct WindGridParams {
    #[serde(rename = "centerLat")]
    pub center_lat: Option<String>,
    #[serde(rename = "centerLon")]
    pub center_lon: Option<String>,
    #[serde(rename = "radiusKm")]
    pub radius_km: Option<String>,
    #[serde(rename = "cellKm")]
    pub cell_km: Option<String>,
    #[serde(rename = "maxCells")]
    pub max_cells: Option<String>,
}

impl WindGridParams {
    pub fn parse(&self) -> WindResult<GridRequest> {
        let lat = required::<f64>("centerLat", &self.center_lat)?;
        let lon = required::<f64>("centerLon", &self.center_lon)?;

        GridRequest::new(
            LatLon::new(lat, lon),
            optional("radiusKm", &self.radius_km)?,
            optional("cellKm", &self.cell_km)?,
            optional("maxCells", &self.max_cells)?,
        )
    }
}

fn required<T: FromStr>(name: &str, raw: &Option<String>) -> WindResult<T> {
    optional(name, raw)?.ok_or_else(|| WindError::invalid(name, "is required"))
}

fn optional<T: FromStr>(name: &str, raw: &Option<String>) -> WindResult<Option<T>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| WindError::invalid(name, format!("'{}' is not a valid number", value))),
    }
}

/// GET /nws/forecast/windgrid?centerLat&centerLon&radiusKm&cellKm&maxCells
#[instrument(skip(state))]
pub async fn windgrid_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<WindGridParams>,
) -> ApiResult<Json<WindFeatureCollection>> {
    counter!("wind_api_requests_total", "endpoint" => "windgrid").increment(1);

    let request = params.parse()?;
    let cells = grid_cells(&request);

    Ok(Json(lookup_features(&state, cells).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> WindGridParams {
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        };
        WindGridParams {
            center_lat: get("centerLat"),
            center_lon: get("centerLon"),
            radius_km: get("radiusKm"),
            cell_km: get("cellKm"),
            max_cells: get("maxCells"),
        }
    }

    #[test]
    fn test_parse_full_query() {
        let request = params(&[
            ("centerLat", "40.00"),
            ("centerLon", "-70.00"),
            ("radiusKm", "40"),
            ("cellKm", "10"),
            ("maxCells", "120"),
        ])
        .parse()
        .unwrap();

        assert_eq!(request.center, LatLon::new(40.0, -70.0));
        assert_eq!(request.max_cells, 120);
    }

    #[test]
    fn test_missing_center_is_rejected() {
        let err = params(&[("centerLon", "-70")]).parse().unwrap_err();
        assert!(matches!(err, WindError::InvalidParameter { ref param, .. } if param == "centerLat"));
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        let err = params(&[("centerLat", "40"), ("centerLon", "-70"), ("maxCells", "lots")])
            .parse()
            .unwrap_err();
        assert!(matches!(err, WindError::InvalidParameter { ref param, .. } if param == "maxCells"));
    }

    #[test]
    fn test_blank_optional_uses_default() {
        let request = params(&[("centerLat", "40"), ("centerLon", "-70"), ("radiusKm", "")])
            .parse()
            .unwrap();
        assert_eq!(request.radius_km, 40.0);
    }

    #[test]
    fn test_fixture_matches_published_values() {
        let data = test_wind_data();
        assert_eq!(data.len(), 2);
        assert_eq!(data.features[0].position(), LatLon::new(35.0, -75.0));
        assert_eq!(data.features[1].properties.speed_kmh, Some(41.3));
    }
}
