//! Global patch grid arithmetic.
//!
//! Pure conversions between geographic positions and patch cell indices of the
//! equirectangular grid anchored at (90°N, 180°W), plus grid-aligned bounds.

use crate::types::{GeoBounds, GeoPosition, PatchCellIndex, PatchGridSpec};

/// Quotients this close to an integer are treated as lying on a grid line
pub const GRID_EPSILON: f64 = 1e-9;

/// `floor(value / extent)`, snapping quotients within `GRID_EPSILON` of an integer.
///
/// 200 * 0.009 is 1.7999999999999998, and -180 divided by it is -100.00000000000001.
pub fn grid_steps(value: f64, extent: f64) -> f64 {
    let q = value / extent;
    let nearest = q.round();
    if (q - nearest).abs() < GRID_EPSILON {
        nearest
    } else {
        q.floor()
    }
}

/// Cell index owning a geographic position.
///
/// No clamping is applied; latitude/longitude must already be in range.
pub fn cell_index_of(lat: f64, lon: f64, spec: &PatchGridSpec) -> PatchCellIndex {
    let extent = spec.patch_extent_deg();
    let x = grid_steps(lon - PatchGridSpec::ORIGIN_LON, extent) as i64;
    let y = grid_steps(PatchGridSpec::ORIGIN_LAT - lat, extent) as i64;
    PatchCellIndex::new(x, y)
}

/// Geographic rectangle covered by a cell
pub fn cell_bounds(cell: PatchCellIndex, spec: &PatchGridSpec) -> GeoBounds {
    let extent = spec.patch_extent_deg();
    let west = cell.x as f64 * extent + PatchGridSpec::ORIGIN_LON;
    let north = PatchGridSpec::ORIGIN_LAT - cell.y as f64 * extent;
    GeoBounds {
        north,
        south: north - extent,
        west,
        east: west + extent,
    }
}

/// Largest multiple of `extent` not greater than `v`
pub fn lower_bound_of(v: f64, extent: f64) -> f64 {
    grid_steps(v, extent) * extent
}

/// Lower bound of `v + extent`; always one full extent above `lower_bound_of(v)`
pub fn upper_bound_of(v: f64, extent: f64) -> f64 {
    grid_steps(v + extent, extent) * extent
}

/// Grid-aligned bounding box of a set of positions as (lower, upper) corners.
///
/// An empty input yields NaN corners; callers check `GeoPosition::is_nan`.
pub fn bounding_box(positions: &[GeoPosition], extent: f64) -> (GeoPosition, GeoPosition) {
    if positions.is_empty() {
        return (GeoPosition::nan(), GeoPosition::nan());
    }

    let mut lower = GeoPosition::new(f64::INFINITY, f64::INFINITY);
    let mut upper = GeoPosition::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for pos in positions {
        lower.lat = lower.lat.min(lower_bound_of(pos.lat, extent));
        lower.lon = lower.lon.min(lower_bound_of(pos.lon, extent));
        upper.lat = upper.lat.max(upper_bound_of(pos.lat, extent));
        upper.lon = upper.lon.max(upper_bound_of(pos.lon, extent));
    }

    (lower, upper)
}
