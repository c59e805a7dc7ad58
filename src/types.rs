use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Binary region-of-interest mask (rows x columns), nonzero = inside
pub type BinaryMask = Array2<u8>;

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPosition {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Sentinel returned for "no data" bounds
    pub fn nan() -> Self {
        Self { lat: f64::NAN, lon: f64::NAN }
    }

    pub fn is_nan(&self) -> bool {
        self.lat.is_nan() || self.lon.is_nan()
    }
}

impl std::fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Global equirectangular patch grid.
///
/// The grid origin is fixed at the north-west corner of the planet
/// (latitude +90, longitude -180). Cells are `patch_extent_deg` wide in both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatchGridSpec {
    patch_size_pixels: usize,
    pixel_resolution_deg: f64,
    patch_extent_deg: f64,
}

impl PatchGridSpec {
    pub const ORIGIN_LAT: f64 = 90.0;
    pub const ORIGIN_LON: f64 = -180.0;

    /// Create a grid spec, rejecting non-positive or non-finite values
    pub fn new(patch_size_pixels: usize, pixel_resolution_deg: f64) -> FexResult<Self> {
        if patch_size_pixels == 0 {
            return Err(FexError::InvalidGridSpec(
                "patch size must be at least one pixel".to_string(),
            ));
        }
        if !pixel_resolution_deg.is_finite() || pixel_resolution_deg <= 0.0 {
            return Err(FexError::InvalidGridSpec(format!(
                "pixel resolution must be a positive number of degrees, got {}",
                pixel_resolution_deg
            )));
        }

        Ok(Self {
            patch_size_pixels,
            pixel_resolution_deg,
            patch_extent_deg: patch_size_pixels as f64 * pixel_resolution_deg,
        })
    }

    pub fn patch_size_pixels(&self) -> usize {
        self.patch_size_pixels
    }

    pub fn pixel_resolution_deg(&self) -> f64 {
        self.pixel_resolution_deg
    }

    /// Edge length of one patch in degrees
    pub fn patch_extent_deg(&self) -> f64 {
        self.patch_extent_deg
    }
}

impl Default for PatchGridSpec {
    fn default() -> Self {
        // 200 pixels at ~1 km
        Self {
            patch_size_pixels: 200,
            pixel_resolution_deg: 0.009,
            patch_extent_deg: 200.0 * 0.009,
        }
    }
}

/// Patch cell index: x grows eastward, y grows southward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatchCellIndex {
    pub x: i64,
    pub y: i64,
}

impl PatchCellIndex {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i64, dy: i64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

impl std::fmt::Display for PatchCellIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X{:04}Y{:04}", self.x, self.y)
    }
}

/// Geographic rectangle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn center(&self) -> GeoPosition {
        GeoPosition::new((self.north + self.south) / 2.0, (self.west + self.east) / 2.0)
    }

    pub fn contains(&self, pos: &GeoPosition) -> bool {
        pos.lat <= self.north && pos.lat >= self.south && pos.lon >= self.west && pos.lon <= self.east
    }
}

/// Geospatial transformation parameters (GDAL coefficient order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Map coordinates (lon, lat) of a pixel corner position
    pub fn pixel_to_geo(&self, x: f64, y: f64) -> GeoPosition {
        let lon = self.top_left_x + x * self.pixel_width + y * self.rotation_x;
        let lat = self.top_left_y + x * self.rotation_y + y * self.pixel_height;
        GeoPosition::new(lat, lon)
    }
}

/// Pixel rectangle of one patch subset inside a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchRegion {
    /// Patch column within the raster
    pub patch_x: usize,
    /// Patch row within the raster
    pub patch_y: usize,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl PatchRegion {
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// (rows, columns), matching `ndarray` dimension order
    pub fn dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Error types for patch feature extraction
#[derive(Debug, thiserror::Error)]
pub enum FexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid footprint: {0}")]
    InvalidFootprint(String),

    #[error("Dimension mismatch: expected {expected:?} (rows, cols), got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid patch grid: {0}")]
    InvalidGridSpec(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid patch name: {0}")]
    InvalidPatchName(String),
}

/// Result type for patch feature extraction
pub type FexResult<T> = Result<T, FexError>;
