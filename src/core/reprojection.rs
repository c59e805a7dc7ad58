use serde::{Deserialize, Serialize};

use crate::core::geo_grid::{bounding_box, cell_index_of, GRID_EPSILON};
use crate::types::{FexError, FexResult, GeoPosition, GeoTransform, PatchCellIndex, PatchGridSpec};

/// WKT of the plate carrée (WGS84 geographic) target coordinate system
pub const TARGET_CRS_WKT: &str = "GEOGCS[\"WGS84(DD)\",\
DATUM[\"WGS84\",SPHEROID[\"WGS84\", 6378137.0, 298.257223563]],\
PRIMEM[\"Greenwich\", 0.0],\
UNIT[\"degree\", 0.017453292519943295],\
AXIS[\"Geodetic longitude\", EAST],\
AXIS[\"Geodetic latitude\", NORTH]]";

/// Resampling method the external reprojector must use
pub const TARGET_RESAMPLING: &str = "Nearest";

/// Target raster geometry for reprojecting a scene onto the patch grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReprojectionTarget {
    /// Target width in pixels, a multiple of the patch size
    pub width: usize,
    /// Target height in pixels, a multiple of the patch size
    pub height: usize,
    /// Latitude of the top edge of the target
    pub northing: f64,
    /// Longitude of the left edge of the target
    pub easting: f64,
    /// Cell owning the reference (north-west) corner
    pub cell: PatchCellIndex,
    pub patch_size_pixels: usize,
    pub pixel_resolution_deg: f64,
    /// Whether the footprint was shifted to cross the antimeridian contiguously
    pub normalized: bool,
}

impl ReprojectionTarget {
    /// Patch name token of the reference cell, e.g. `X0122Y0033`
    pub fn name(&self) -> String {
        self.cell.to_string()
    }

    /// Number of patches across and down
    pub fn patch_counts(&self) -> (usize, usize) {
        (
            self.width / self.patch_size_pixels,
            self.height / self.patch_size_pixels,
        )
    }

    /// Global cell of the patch at (patch_x, patch_y) inside this target
    pub fn patch_cell(&self, patch_x: usize, patch_y: usize) -> PatchCellIndex {
        self.cell.offset(patch_x as i64, patch_y as i64)
    }

    /// North-up affine transform anchored at the reference corner
    pub fn geo_transform(&self) -> GeoTransform {
        GeoTransform {
            top_left_x: self.easting,
            pixel_width: self.pixel_resolution_deg,
            rotation_x: 0.0,
            top_left_y: self.northing,
            rotation_y: 0.0,
            pixel_height: -self.pixel_resolution_deg,
        }
    }
}

/// Smallest `q` with `q * d >= n`
pub fn ceil_div(n: usize, d: usize) -> usize {
    (n + d - 1) / d
}

/// Shift negative longitudes by +360° if the closed polygon crosses the antimeridian.
///
/// Returns whether the shift was applied.
pub fn normalize_antimeridian(polygon: &mut [GeoPosition]) -> bool {
    let n = polygon.len();
    if n < 2 {
        return false;
    }

    let crosses = (0..n).any(|i| {
        let a = polygon[i].lon;
        let b = polygon[(i + 1) % n].lon;
        (a - b).abs() > 180.0
    });

    if crosses {
        for pos in polygon.iter_mut() {
            if pos.lon < 0.0 {
                pos.lon += 360.0;
            }
        }
    }
    crosses
}

/// Plans grid-aligned reprojection targets from scene footprints
#[derive(Debug, Clone)]
pub struct ReprojectionPlanner {
    spec: PatchGridSpec,
}

impl ReprojectionPlanner {
    pub fn new(spec: PatchGridSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &PatchGridSpec {
        &self.spec
    }

    /// Compute the target geometry for a closed footprint polygon
    pub fn plan(&self, footprint: &[GeoPosition]) -> FexResult<ReprojectionTarget> {
        self.validate_footprint(footprint)?;

        let mut polygon = footprint.to_vec();
        let normalized = normalize_antimeridian(&mut polygon);
        if normalized {
            log::warn!("Footprint crosses the antimeridian, longitudes normalized to a contiguous range");
        }

        let extent = self.spec.patch_extent_deg();
        let resolution = self.spec.pixel_resolution_deg();
        let patch_size = self.spec.patch_size_pixels();

        let (mut lower, upper) = bounding_box(&polygon, extent);
        log::debug!("Aligned bounds: lower {} upper {}", lower, upper);

        // Both bounds sit on the grid, so the spans are whole pixel counts up to rounding noise
        let raw_width = ((upper.lon - lower.lon) / resolution).round() as usize;
        let raw_height = ((upper.lat - lower.lat) / resolution).round() as usize;

        let width = patch_size * ceil_div(raw_width, patch_size);
        let height = patch_size * ceil_div(raw_height, patch_size);
        if width == 0 || height == 0 {
            return Err(FexError::InvalidFootprint(format!(
                "aligned target has zero size ({}x{})",
                width, height
            )));
        }

        // Only reachable when a vertex sits on the antimeridian itself at +180
        if normalized && lower.lon >= 180.0 - GRID_EPSILON {
            lower.lon -= 360.0;
        }

        let easting = lower.lon;
        let northing = lower.lat + height as f64 * resolution;

        // Owning cell taken at the centre of the first target pixel, off the grid line
        let half = 0.5 * resolution;
        let cell = cell_index_of(northing - half, easting + half, &self.spec);

        log::info!(
            "Reprojection target {}: {}x{} pixels, northing {:.6}, easting {:.6}",
            cell, width, height, northing, easting
        );

        Ok(ReprojectionTarget {
            width,
            height,
            northing,
            easting,
            cell,
            patch_size_pixels: patch_size,
            pixel_resolution_deg: resolution,
            normalized,
        })
    }

    fn validate_footprint(&self, footprint: &[GeoPosition]) -> FexResult<()> {
        if let Some(pos) = footprint
            .iter()
            .find(|p| !p.lat.is_finite() || !p.lon.is_finite() || p.lat.abs() > 90.0)
        {
            return Err(FexError::InvalidFootprint(format!(
                "vertex {} is not a valid geographic position",
                pos
            )));
        }

        let mut distinct: Vec<GeoPosition> = Vec::with_capacity(footprint.len());
        for pos in footprint {
            if !distinct.contains(pos) {
                distinct.push(*pos);
            }
        }
        if distinct.len() < 3 {
            return Err(FexError::InvalidFootprint(format!(
                "polygon needs at least 3 distinct vertices, got {}",
                distinct.len()
            )));
        }

        let (min_lat, max_lat) = min_max(footprint.iter().map(|p| p.lat));
        let (min_lon, max_lon) = min_max(footprint.iter().map(|p| p.lon));
        if max_lat <= min_lat || max_lon <= min_lon {
            return Err(FexError::InvalidFootprint(format!(
                "degenerate extent: lat [{}, {}], lon [{}, {}]",
                min_lat, max_lat, min_lon, max_lon
            )));
        }

        Ok(())
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}
