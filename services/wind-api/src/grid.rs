//! Sample point generation.
//!
//! Two point sets are queried upstream:
//!
//! - the fixed East Coast ocean grid behind `/ocean-wind-data`
//! - the cells of one client tile behind `/nws/forecast/windgrid`

use wind_common::{km_to_deg_lat, km_to_deg_lon, LatLon, MapBounds, WindError, WindResult};

/// Spacing of the ocean grid.
pub const OCEAN_GRID_SPACING_KM: f64 = 10.0;

/// The ocean feed looks up only the first this many grid points...
pub const OCEAN_FEED_POINT_LIMIT: usize = 100;

/// ...and of those, every this many-th one.
pub const OCEAN_FEED_SAMPLE_STRIDE: usize = 5;

/// Degrees-to-km factor used for both axes of the ocean grid.
const OCEAN_KM_PER_DEG: f64 = 111.32;

pub const DEFAULT_RADIUS_KM: f64 = 40.0;
pub const DEFAULT_CELL_KM: f64 = 10.0;
pub const DEFAULT_MAX_CELLS: usize = 120;

pub const MAX_RADIUS_KM: f64 = 500.0;
pub const MAX_CELLS_LIMIT: usize = 1000;

// ============================================================================
// Ocean grid
// ============================================================================

/// Rough mask of open water off the East Coast.
pub fn is_offshore(lat: f64, lon: f64) -> bool {
    lon < -75.0 || (lat > 35.0 && lon < -70.0)
}

/// Points every `spacing_km` across `bounds`, south to north then west to
/// east, keeping only offshore points.
pub fn ocean_grid(bounds: &MapBounds, spacing_km: f64) -> Vec<LatLon> {
    if !bounds.is_valid() || !(spacing_km.is_finite() && spacing_km > 0.0) {
        return Vec::new();
    }

    let lat_step = spacing_km / OCEAN_KM_PER_DEG;
    let mut points = Vec::new();

    let mut row = 0;
    loop {
        let lat = bounds.south + row as f64 * lat_step;
        if lat > bounds.north {
            break;
        }

        let lon_step = spacing_km / (OCEAN_KM_PER_DEG * lat.to_radians().cos());
        let mut col = 0;
        loop {
            let lon = bounds.west + col as f64 * lon_step;
            if lon > bounds.east {
                break;
            }
            if is_offshore(lat, lon) {
                points.push(LatLon::new(lat, lon));
            }
            col += 1;
        }
        row += 1;
    }

    tracing::debug!(count = points.len(), "Created ocean grid");
    points
}

/// The subset of the ocean grid the feed actually queries.
pub fn ocean_feed_points(grid: &[LatLon]) -> Vec<LatLon> {
    grid.iter()
        .take(OCEAN_FEED_POINT_LIMIT)
        .step_by(OCEAN_FEED_SAMPLE_STRIDE)
        .copied()
        .collect()
}

// ============================================================================
// Tile cells
// ============================================================================

/// One validated wind-grid tile request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRequest {
    pub center: LatLon,
    pub radius_km: f64,
    pub cell_km: f64,
    pub max_cells: usize,
}

impl GridRequest {
    /// Build a request, applying defaults for the optional fields.
    pub fn new(
        center: LatLon,
        radius_km: Option<f64>,
        cell_km: Option<f64>,
        max_cells: Option<usize>,
    ) -> WindResult<Self> {
        let request = Self {
            center,
            radius_km: radius_km.unwrap_or(DEFAULT_RADIUS_KM),
            cell_km: cell_km.unwrap_or(DEFAULT_CELL_KM),
            max_cells: max_cells.unwrap_or(DEFAULT_MAX_CELLS),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> WindResult<()> {
        if !(self.center.lat.is_finite() && (-90.0..=90.0).contains(&self.center.lat)) {
            return Err(WindError::invalid("centerLat", "must be within [-90, 90]"));
        }
        if !(self.center.lon.is_finite() && (-180.0..=180.0).contains(&self.center.lon)) {
            return Err(WindError::invalid("centerLon", "must be within [-180, 180]"));
        }
        if !(self.radius_km.is_finite() && self.radius_km > 0.0 && self.radius_km <= MAX_RADIUS_KM) {
            return Err(WindError::invalid(
                "radiusKm",
                format!("must be greater than 0 and at most {}", MAX_RADIUS_KM),
            ));
        }
        if !(self.cell_km.is_finite() && self.cell_km > 0.0 && self.cell_km <= 2.0 * self.radius_km) {
            return Err(WindError::invalid(
                "cellKm",
                "must be greater than 0 and at most twice radiusKm",
            ));
        }
        if self.max_cells == 0 || self.max_cells > MAX_CELLS_LIMIT {
            return Err(WindError::invalid(
                "maxCells",
                format!("must be between 1 and {}", MAX_CELLS_LIMIT),
            ));
        }
        Ok(())
    }
}

/// Cell centers of a tile: a `cell_km` lattice around the center, limited to
/// the radius, nearest first, at most `max_cells` of them.
pub fn grid_cells(request: &GridRequest) -> Vec<LatLon> {
    let center = request.center;
    let lat_step = km_to_deg_lat(request.cell_km);
    let lon_step = km_to_deg_lon(request.cell_km, center.lat);

    // Rings beyond this cannot hold any of the `max_cells` nearest cells
    let ring_cap = (request.max_cells as f64).sqrt().ceil() as i64 + 1;
    let rings = ((request.radius_km / request.cell_km).ceil() as i64).min(ring_cap);

    let mut cells = Vec::new();
    for i in -rings..=rings {
        let lat = center.lat + i as f64 * lat_step;
        if !(-90.0..=90.0).contains(&lat) {
            continue;
        }
        for j in -rings..=rings {
            let cell = LatLon::new(lat, wrap_lon(center.lon + j as f64 * lon_step));
            let distance = center.distance_km(&cell);
            if distance <= request.radius_km {
                cells.push((distance, cell));
            }
        }
    }

    // Stable: equal distances keep lattice order
    cells.sort_by(|a, b| a.0.total_cmp(&b.0));
    cells.truncate(request.max_cells);
    cells.into_iter().map(|(_, cell)| cell).collect()
}

fn wrap_lon(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(radius: f64, cell: f64, max_cells: usize) -> GridRequest {
        GridRequest::new(LatLon::new(40.0, -70.0), Some(radius), Some(cell), Some(max_cells)).unwrap()
    }

    #[test]
    fn test_ocean_grid_is_offshore_and_in_bounds() {
        let bounds = MapBounds::east_coast();
        let grid = ocean_grid(&bounds, OCEAN_GRID_SPACING_KM);

        assert!(grid.len() > OCEAN_FEED_POINT_LIMIT);
        for p in &grid {
            assert!(bounds.contains(p));
            assert!(is_offshore(p.lat, p.lon));
        }
        assert_eq!(grid[0], LatLon::new(24.0, -82.0));
    }

    #[test]
    fn test_ocean_feed_samples_every_fifth() {
        let grid = ocean_grid(&MapBounds::east_coast(), OCEAN_GRID_SPACING_KM);
        let sampled = ocean_feed_points(&grid);

        assert_eq!(sampled.len(), 20);
        assert_eq!(sampled[1], grid[5]);
        assert_eq!(sampled[19], grid[95]);
    }

    #[test]
    fn test_offshore_mask() {
        assert!(is_offshore(30.0, -80.0));
        assert!(is_offshore(40.0, -72.0));
        assert!(!is_offshore(30.0, -72.0));
        assert!(!is_offshore(40.0, -68.0));
    }

    #[test]
    fn test_cells_within_radius_nearest_first() {
        let req = request(40.0, 10.0, 120);
        let cells = grid_cells(&req);

        assert!(!cells.is_empty());
        assert!(cells.len() <= 120);
        assert_eq!(cells[0], req.center);

        let distances: Vec<f64> = cells.iter().map(|c| req.center.distance_km(c)).collect();
        assert!(distances.iter().all(|d| *d <= 40.0));
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_cells_truncated_to_max() {
        let cells = grid_cells(&request(40.0, 10.0, 5));
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn test_tiny_cells_stay_bounded() {
        let cells = grid_cells(&request(500.0, 0.01, 1000));
        assert_eq!(cells.len(), 1000);
    }

    #[test]
    fn test_defaults_applied() {
        let req = GridRequest::new(LatLon::new(40.0, -70.0), None, None, None).unwrap();
        assert_eq!(req.radius_km, DEFAULT_RADIUS_KM);
        assert_eq!(req.cell_km, DEFAULT_CELL_KM);
        assert_eq!(req.max_cells, DEFAULT_MAX_CELLS);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let center = LatLon::new(40.0, -70.0);
        let cases = [
            (LatLon::new(91.0, -70.0), None, None, None, "centerLat"),
            (LatLon::new(40.0, -181.0), None, None, None, "centerLon"),
            (center, Some(0.0), None, None, "radiusKm"),
            (center, Some(501.0), None, None, "radiusKm"),
            (center, Some(10.0), Some(25.0), None, "cellKm"),
            (center, None, Some(-1.0), None, "cellKm"),
            (center, None, None, Some(0), "maxCells"),
            (center, None, None, Some(1001), "maxCells"),
        ];

        for (center, radius, cell, max, expected) in cases {
            match GridRequest::new(center, radius, cell, max) {
                Err(WindError::InvalidParameter { param, .. }) => assert_eq!(param, expected),
                other => panic!("expected {} rejection, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_wrap_lon() {
        assert_eq!(wrap_lon(-70.0), -70.0);
        assert!((wrap_lon(181.0) - -179.0).abs() < 1e-9);
        assert!((wrap_lon(-181.0) - 179.0).abs() < 1e-9);
    }
}
