//! patchfex: patch-grid geocoding and spatial pattern metrics
//!
//! Maps scene footprints onto a fixed global equirectangular patch grid, plans
//! grid-aligned reprojection targets, and decides from binary ROI masks whether a
//! patch holds enough well-distributed valid pixels for feature extraction.

pub mod types;
pub mod io;
pub mod core;

#[cfg(feature = "python")]
mod python;

// Re-export main types
pub use types::{
    BinaryMask, FexError, FexResult, GeoBounds, GeoPosition, GeoTransform, PatchCellIndex,
    PatchGridSpec, PatchRegion,
};
pub use crate::core::{AcceptanceVerdict, PatchAcceptanceGate, ReprojectionPlanner, SpatialMetrics};
pub use io::{FexConfig, PatchName};
