use serde::Serialize;

use crate::core::clumpiness::clumpiness;
use crate::core::connectivity::ConnectivityMetric;
use crate::core::contagion::{ContagionIndex, Neighborhood};
use crate::types::{BinaryMask, FexError, FexResult};

/// Number of nonzero (inside) pixels
pub fn inside_count(mask: &BinaryMask) -> usize {
    mask.iter().filter(|&&v| v != 0).count()
}

/// Inside pixels over all pixels; 0 for an empty raster
pub fn masked_ratio(mask: &BinaryMask) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    inside_count(mask) as f64 / mask.len() as f64
}

/// Pixels inside both masks
pub fn overlap_count(a: &BinaryMask, b: &BinaryMask) -> FexResult<usize> {
    if a.dim() != b.dim() {
        return Err(FexError::DimensionMismatch {
            expected: a.dim(),
            actual: b.dim(),
        });
    }
    Ok(a.iter().zip(b.iter()).filter(|(&x, &y)| x != 0 && y != 0).count())
}

/// Shape and pattern descriptors of one ROI mask
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpatialMetrics {
    pub inside_count: usize,
    pub section_length_ratio: f64,
    pub fractal_index: f64,
    pub contagion_index: f64,
    pub clumpiness: f64,
}

impl SpatialMetrics {
    pub fn compute(mask: &BinaryMask, neighborhood: Neighborhood) -> Self {
        let connectivity = ConnectivityMetric::compute(mask);
        Self {
            inside_count: connectivity.occupied_count,
            section_length_ratio: connectivity.section_length_ratio,
            fractal_index: connectivity.fractal_index,
            contagion_index: ContagionIndex::compute(mask, neighborhood).value,
            clumpiness: clumpiness(mask),
        }
    }
}
