use std::collections::HashMap;
use std::time::Instant;

use ndarray::s;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::core::acceptance::{AcceptanceVerdict, PatchAcceptanceGate, RejectionReason};
use crate::core::reprojection::ReprojectionTarget;
use crate::types::{BinaryMask, FexError, FexResult, PatchCellIndex, PatchRegion};

/// Row-major patch tiling of a raster; trailing regions are clipped, never padded
pub fn patch_regions(
    width: usize,
    height: usize,
    patch_width: usize,
    patch_height: usize,
) -> Vec<PatchRegion> {
    if width == 0 || height == 0 || patch_width == 0 || patch_height == 0 {
        return Vec::new();
    }

    let count_x = (width + patch_width - 1) / patch_width;
    let count_y = (height + patch_height - 1) / patch_height;

    let mut regions = Vec::with_capacity(count_x * count_y);
    for patch_y in 0..count_y {
        for patch_x in 0..count_x {
            let x = patch_x * patch_width;
            let y = patch_y * patch_height;
            regions.push(PatchRegion {
                patch_x,
                patch_y,
                x,
                y,
                width: patch_width.min(width - x),
                height: patch_height.min(height - y),
            });
        }
    }
    regions
}

/// Gate outcome for one patch of a scene
#[derive(Debug, Clone, Serialize)]
pub struct PatchEvaluation {
    pub region: PatchRegion,
    pub cell: PatchCellIndex,
    /// `X%04dY%04d` token of the owning cell
    pub name: String,
    pub verdict: AcceptanceVerdict,
}

/// All patch outcomes of one scene in row-major order
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub evaluations: Vec<PatchEvaluation>,
    pub accepted_count: usize,
    pub rejected: HashMap<RejectionReason, usize>,
}

impl BatchReport {
    pub fn accepted(&self) -> impl Iterator<Item = &PatchEvaluation> {
        self.evaluations.iter().filter(|e| e.verdict.accepted)
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Run the acceptance gate over every patch of a reprojected scene.
///
/// `roi_mask` covers the whole target raster. Patches are independent and are
/// evaluated in parallel when the `parallel` feature is enabled.
pub fn evaluate_patches(
    target: &ReprojectionTarget,
    roi_mask: &BinaryMask,
    gate: &PatchAcceptanceGate,
) -> FexResult<BatchReport> {
    let expected = (target.height, target.width);
    if roi_mask.dim() != expected {
        return Err(FexError::DimensionMismatch {
            expected,
            actual: roi_mask.dim(),
        });
    }
    if roi_mask.iter().any(|&v| v > 1) {
        log::warn!("ROI mask holds values other than 0/1; any nonzero value counts as inside");
    }

    let start = Instant::now();
    let patch_size = target.patch_size_pixels;
    let required = patch_size * patch_size;
    let regions = patch_regions(target.width, target.height, patch_size, patch_size);

    let evaluate = |region: &PatchRegion| -> FexResult<PatchEvaluation> {
        let subset = roi_mask
            .slice(s![region.y..region.y + region.height, region.x..region.x + region.width])
            .to_owned();
        let verdict = gate.evaluate(required, region.dim(), &subset)?;
        let cell = target.patch_cell(region.patch_x, region.patch_y);
        Ok(PatchEvaluation {
            region: *region,
            cell,
            name: cell.to_string(),
            verdict,
        })
    };

    #[cfg(feature = "parallel")]
    let evaluations: FexResult<Vec<PatchEvaluation>> = regions.par_iter().map(evaluate).collect();
    #[cfg(not(feature = "parallel"))]
    let evaluations: FexResult<Vec<PatchEvaluation>> = regions.iter().map(evaluate).collect();
    let evaluations = evaluations?;

    let mut accepted_count = 0;
    let mut rejected: HashMap<RejectionReason, usize> = HashMap::new();
    for evaluation in &evaluations {
        if evaluation.verdict.accepted {
            accepted_count += 1;
        } else {
            *rejected.entry(evaluation.verdict.reason).or_insert(0) += 1;
        }
    }

    log::info!(
        "✅ Completed {} patches of {} in {:.1} sec: {} accepted, {} rejected",
        evaluations.len(),
        target.name(),
        start.elapsed().as_secs_f64(),
        accepted_count,
        evaluations.len() - accepted_count
    );

    Ok(BatchReport {
        evaluations,
        accepted_count,
        rejected,
    })
}
