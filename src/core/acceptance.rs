//! Patch acceptance gate.
//!
//! Three sequential checks decide whether a candidate patch carries enough
//! well-distributed valid pixels for feature computation:
//!
//! 1. coverage: extracted subset size against the nominal patch size
//! 2. validity: inside pixels against the nominal patch size
//! 3. dispersion: clumpiness of the inside pixels, only for minority-valid patches
//!
//! A rejection is a normal outcome reported through the verdict, never an error.

use serde::{Deserialize, Serialize};

use crate::core::clumpiness::clumpiness;
use crate::core::connectivity::ConnectivityMetric;
use crate::core::contagion::{ContagionIndex, Neighborhood};
use crate::types::{BinaryMask, FexError, FexResult};

/// Valid ratio from which a patch skips the dispersion check
pub const MAJORITY_VALID_RATIO: f64 = 0.5;

/// Gate thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceConfig {
    /// In [0, 1]
    pub min_valid_pixel_ratio: f64,
    /// Same scale as clumpiness, [-1, 1]
    pub min_clumpiness: f64,
    /// Adjacency rule for the contagion descriptor
    pub neighborhood: Neighborhood,
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            min_valid_pixel_ratio: 0.2,
            min_clumpiness: 0.0,
            neighborhood: Neighborhood::Queen,
        }
    }
}

impl AcceptanceConfig {
    pub fn validate(&self) -> FexResult<()> {
        if !(0.0..=1.0).contains(&self.min_valid_pixel_ratio) {
            return Err(FexError::Config(format!(
                "minValidPixelRatio must be in [0, 1], got {}",
                self.min_valid_pixel_ratio
            )));
        }
        if !self.min_clumpiness.is_finite() {
            return Err(FexError::Config(format!(
                "minClumpiness must be finite, got {}",
                self.min_clumpiness
            )));
        }
        Ok(())
    }
}

/// Why a patch was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    None,
    InsufficientTotalPixels,
    InsufficientValidRatio,
    LowClumpiness,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RejectionReason::None => "NONE",
            RejectionReason::InsufficientTotalPixels => "INSUFFICIENT_TOTAL_PIXELS",
            RejectionReason::InsufficientValidRatio => "INSUFFICIENT_VALID_RATIO",
            RejectionReason::LowClumpiness => "LOW_CLUMPINESS",
        };
        write!(f, "{}", name)
    }
}

/// Gate state machine stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStage {
    Candidate,
    ValidCoverage,
    ValidDensity,
    Accepted,
    Rejected,
}

/// Numeric descriptors carried forward for an accepted patch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatchDescriptors {
    pub valid_pixel_ratio: f64,
    pub section_length_ratio: f64,
    pub fractal_index: f64,
    pub contagion_index: f64,
    pub clumpiness: f64,
}

/// Outcome of one gate evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AcceptanceVerdict {
    pub accepted: bool,
    pub reason: RejectionReason,
    /// Last stage passed before the verdict
    pub stage: GateStage,
    /// Present only when accepted
    pub descriptors: Option<PatchDescriptors>,
}

impl AcceptanceVerdict {
    fn rejected(reason: RejectionReason, stage: GateStage) -> Self {
        Self {
            accepted: false,
            reason,
            stage,
            descriptors: None,
        }
    }

    fn accepted(descriptors: PatchDescriptors) -> Self {
        Self {
            accepted: true,
            reason: RejectionReason::None,
            stage: GateStage::ValidDensity,
            descriptors: Some(descriptors),
        }
    }

    /// Terminal state of the gate
    pub fn final_stage(&self) -> GateStage {
        if self.accepted {
            GateStage::Accepted
        } else {
            GateStage::Rejected
        }
    }
}

/// Accepts or rejects candidate patches against configured thresholds
#[derive(Debug, Clone)]
pub struct PatchAcceptanceGate {
    config: AcceptanceConfig,
}

impl PatchAcceptanceGate {
    pub fn new(config: AcceptanceConfig) -> FexResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AcceptanceConfig {
        &self.config
    }

    /// Evaluate one candidate patch.
    ///
    /// `actual_dim` is the (rows, columns) size of the extracted subset and must match
    /// the ROI mask; `required_pixel_count` is the nominal patch area.
    pub fn evaluate(
        &self,
        required_pixel_count: usize,
        actual_dim: (usize, usize),
        mask: &BinaryMask,
    ) -> FexResult<AcceptanceVerdict> {
        if required_pixel_count == 0 {
            return Err(FexError::Config("required pixel count must be positive".to_string()));
        }
        if mask.dim() != actual_dim {
            return Err(FexError::DimensionMismatch {
                expected: actual_dim,
                actual: mask.dim(),
            });
        }

        let required = required_pixel_count as f64;
        let min_ratio = self.config.min_valid_pixel_ratio;

        let patch_pixel_ratio = (actual_dim.0 * actual_dim.1) as f64 / required;
        if patch_pixel_ratio < min_ratio {
            log::debug!(
                "Patch rejected at coverage: {:.3} < {:.3}",
                patch_pixel_ratio, min_ratio
            );
            return Ok(AcceptanceVerdict::rejected(
                RejectionReason::InsufficientTotalPixels,
                GateStage::Candidate,
            ));
        }

        let connectivity = ConnectivityMetric::compute(mask);
        let valid_pixel_ratio = connectivity.occupied_count as f64 / required;
        if valid_pixel_ratio <= min_ratio {
            log::debug!(
                "Patch rejected at validity: {:.3} <= {:.3}",
                valid_pixel_ratio, min_ratio
            );
            return Ok(AcceptanceVerdict::rejected(
                RejectionReason::InsufficientValidRatio,
                GateStage::ValidCoverage,
            ));
        }

        let clumpiness = clumpiness(mask);
        if valid_pixel_ratio < MAJORITY_VALID_RATIO && clumpiness < self.config.min_clumpiness {
            log::debug!(
                "Patch rejected at dispersion: clumpiness {:.3} < {:.3}",
                clumpiness, self.config.min_clumpiness
            );
            return Ok(AcceptanceVerdict::rejected(
                RejectionReason::LowClumpiness,
                GateStage::ValidDensity,
            ));
        }

        Ok(AcceptanceVerdict::accepted(PatchDescriptors {
            valid_pixel_ratio,
            section_length_ratio: connectivity.section_length_ratio,
            fractal_index: connectivity.fractal_index,
            contagion_index: ContagionIndex::compute(mask, self.config.neighborhood).value,
            clumpiness,
        }))
    }
}
