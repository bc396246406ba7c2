//! Tile grid geometry.
//!
//! Tiles are laid out on a global lattice anchored at (0°, 0°) with one tile
//! diameter between neighboring centers. Latitude rows use the constant
//! 110.574 km per degree; columns use 111.320 km × cos(latitude) evaluated at
//! the map center.

use std::ops::RangeInclusive;

use wind_common::{km_to_deg_lat, km_to_deg_lon, LatLon, MapBounds};

/// Spacing between adjacent tile centers, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileStep {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

/// Tile spacing for tiles of `tile_radius_km` around `center_lat`.
pub fn tile_step(center_lat: f64, tile_radius_km: f64) -> TileStep {
    let diameter = 2.0 * tile_radius_km;
    TileStep {
        lat_deg: km_to_deg_lat(diameter),
        lon_deg: km_to_deg_lon(diameter, center_lat),
    }
}

/// Enumerate tile centers covering `bounds` plus one tile of margin on each
/// side, row by row from south to north and west to east within a row.
///
/// Latitudes are clamped to the poles before the lattice is laid out.
/// Returns an empty list for non-finite or inverted bounds and for a
/// non-positive radius.
///
/// Every center is built; use [`tile_centers_near_center`] when the view may
/// be arbitrarily large.
pub fn tile_centers_for_view(bounds: &MapBounds, center: &LatLon, tile_radius_km: f64) -> Vec<LatLon> {
    match Lattice::new(bounds, center, tile_radius_km) {
        Some(lattice) => lattice.centers(&lattice.rows, &lattice.cols),
        None => Vec::new(),
    }
}

/// Tiles selected for a view, and how many the full cover would need.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCover {
    pub centers: Vec<LatLon>,
    /// Size of the full cover, saturating at `u64::MAX`.
    pub needed: u64,
}

impl TileCover {
    pub fn is_truncated(&self) -> bool {
        self.needed > self.centers.len() as u64
    }
}

/// Like [`tile_centers_for_view`], but keeps at most `limit` tiles, those
/// nearest `center`.
///
/// When the cover is larger than `limit` only a window of lattice indices
/// around the center is enumerated, so the work stays proportional to
/// `limit` however large the view or small the radius. Within the window
/// tiles are ordered by distance from the center.
pub fn tile_centers_near_center(
    bounds: &MapBounds,
    center: &LatLon,
    tile_radius_km: f64,
    limit: usize,
) -> TileCover {
    let Some(lattice) = Lattice::new(bounds, center, tile_radius_km) else {
        return TileCover {
            centers: Vec::new(),
            needed: 0,
        };
    };

    let needed = lattice.len();
    let needed_u64 = u64::try_from(needed).unwrap_or(u64::MAX);
    if needed <= limit as u128 {
        return TileCover {
            centers: lattice.centers(&lattice.rows, &lattice.cols),
            needed: needed_u64,
        };
    }
    if limit == 0 {
        return TileCover {
            centers: Vec::new(),
            needed: needed_u64,
        };
    }

    let mid_row = nearest_index(center.lat, lattice.step.lat_deg, &lattice.rows);
    let mid_col = nearest_index(center.lon, lattice.step.lon_deg, &lattice.cols);
    let window_len = |half: i64| {
        let rows = span_len(&window(&lattice.rows, mid_row, half));
        rows.saturating_mul(span_len(&window(&lattice.cols, mid_col, half)))
    };

    // Smallest square window holding `limit` tiles
    let mut lo = 0i64;
    let mut hi = span_width(&lattice.rows).max(span_width(&lattice.cols));
    while lo < hi {
        let half = lo + (hi - lo) / 2;
        if window_len(half) >= limit as u128 {
            hi = half;
        } else {
            lo = half + 1;
        }
    }

    // Steps are one diameter in both directions at the center latitude, so
    // the nearest `limit` tiles lie within the circle through the corners
    let reach = ((lo as f64) * std::f64::consts::SQRT_2).ceil() as i64;
    let half = reach.saturating_add(1);
    let mut centers = lattice.centers(&window(&lattice.rows, mid_row, half), &window(&lattice.cols, mid_col, half));
    centers.sort_by(|a, b| a.distance_km(center).total_cmp(&b.distance_km(center)));
    centers.truncate(limit);

    TileCover {
        centers,
        needed: needed_u64,
    }
}

/// Lattice index ranges covering a view.
struct Lattice {
    step: TileStep,
    rows: RangeInclusive<i64>,
    cols: RangeInclusive<i64>,
}

impl Lattice {
    fn new(bounds: &MapBounds, center: &LatLon, tile_radius_km: f64) -> Option<Self> {
        if !bounds.is_valid() || !center.is_finite() || !(tile_radius_km.is_finite() && tile_radius_km > 0.0) {
            return None;
        }

        let step = tile_step(center.lat, tile_radius_km);
        if !(step.lat_deg > 0.0 && step.lon_deg > 0.0) {
            return None;
        }

        let south = bounds.south.clamp(-90.0, 90.0);
        let north = bounds.north.clamp(-90.0, 90.0);
        Some(Self {
            step,
            rows: lattice_range(south, north, step.lat_deg),
            cols: lattice_range(bounds.west, bounds.east, step.lon_deg),
        })
    }

    fn len(&self) -> u128 {
        span_len(&self.rows).saturating_mul(span_len(&self.cols))
    }

    fn centers(&self, rows: &RangeInclusive<i64>, cols: &RangeInclusive<i64>) -> Vec<LatLon> {
        let count = span_len(rows).saturating_mul(span_len(cols));
        let mut centers = Vec::with_capacity(usize::try_from(count).unwrap_or(0).min(MAX_PREALLOCATED));
        for i in rows.clone() {
            let lat = i as f64 * self.step.lat_deg;
            for j in cols.clone() {
                centers.push(LatLon::new(lat, j as f64 * self.step.lon_deg));
            }
        }
        centers
    }
}

const MAX_PREALLOCATED: usize = 1 << 16;

/// Lattice indices whose coordinates span `[low, high]` with one extra index
/// on each side.
fn lattice_range(low: f64, high: f64, step: f64) -> RangeInclusive<i64> {
    let first = ((low / step).floor() as i64).saturating_sub(1);
    let last = ((high / step).ceil() as i64).saturating_add(1);
    first..=last
}

fn nearest_index(coord: f64, step: f64, range: &RangeInclusive<i64>) -> i64 {
    ((coord / step).round() as i64).clamp(*range.start(), *range.end())
}

fn window(range: &RangeInclusive<i64>, mid: i64, half: i64) -> RangeInclusive<i64> {
    mid.saturating_sub(half).max(*range.start())..=mid.saturating_add(half).min(*range.end())
}

fn span_width(range: &RangeInclusive<i64>) -> i64 {
    range.end().saturating_sub(*range.start())
}

fn span_len(range: &RangeInclusive<i64>) -> u128 {
    let len = i128::from(*range.end()) - i128::from(*range.start()) + 1;
    u128::try_from(len).unwrap_or(0)
}
