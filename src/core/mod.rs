//! Core patch grid and mask metric modules

pub mod geo_grid;
pub mod reprojection;
pub mod connectivity;
pub mod contagion;
pub mod clumpiness;
pub mod mask_metrics;
pub mod acceptance;
pub mod patch_layout;  // Patch subsetting and batch gate evaluation

// Re-export main types
pub use geo_grid::{cell_index_of, cell_bounds, lower_bound_of, upper_bound_of, bounding_box};
pub use reprojection::{ReprojectionPlanner, ReprojectionTarget, normalize_antimeridian};
pub use connectivity::{ConnectivityMetric, section_length_ratio};
pub use contagion::{AdjacencyCounts, ContagionIndex, Neighborhood, contagion_index};
pub use clumpiness::{AggregationMetrics, clumpiness};
pub use mask_metrics::{SpatialMetrics, inside_count, masked_ratio, overlap_count};
pub use acceptance::{
    AcceptanceConfig, AcceptanceVerdict, GateStage, PatchAcceptanceGate,
    PatchDescriptors, RejectionReason
};
pub use patch_layout::{BatchReport, PatchEvaluation, evaluate_patches, patch_regions};
