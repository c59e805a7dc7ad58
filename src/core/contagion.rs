//! Contagion index of a two-class raster (Li & Reynolds 1993, RC2).
//!
//! Ordered adjacent-pair counts are tallied over every pixel and its in-bounds
//! neighbours; no padding or wraparound is applied at the raster edges.

use std::f64::consts::LN_2;

use serde::{Deserialize, Serialize};

use crate::types::BinaryMask;

const OFFSETS_ROOK: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

const OFFSETS_QUEEN: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Pixel adjacency rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Neighborhood {
    /// 4-neighbourhood
    Rook,
    /// 8-neighbourhood
    #[default]
    Queen,
}

impl Neighborhood {
    fn offsets(&self) -> &'static [(isize, isize)] {
        match self {
            Neighborhood::Rook => &OFFSETS_ROOK,
            Neighborhood::Queen => &OFFSETS_QUEEN,
        }
    }
}

/// Ordered adjacent-pair counts keyed by (centre class, neighbour class)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AdjacencyCounts {
    pub n00: usize,
    pub n01: usize,
    pub n10: usize,
    pub n11: usize,
}

impl AdjacencyCounts {
    pub fn tally(mask: &BinaryMask, neighborhood: Neighborhood) -> Self {
        let (height, width) = mask.dim();
        let offsets = neighborhood.offsets();
        let mut counts = Self::default();

        for ((y, x), &center) in mask.indexed_iter() {
            let center_set = center != 0;
            for &(dy, dx) in offsets {
                let (Some(ny), Some(nx)) = (y.checked_add_signed(dy), x.checked_add_signed(dx)) else {
                    continue;
                };
                if ny >= height || nx >= width {
                    continue;
                }
                match (center_set, mask[[ny, nx]] != 0) {
                    (false, false) => counts.n00 += 1,
                    (false, true) => counts.n01 += 1,
                    (true, false) => counts.n10 += 1,
                    (true, true) => counts.n11 += 1,
                }
            }
        }

        counts
    }

    pub fn total(&self) -> usize {
        self.n00 + self.n01 + self.n10 + self.n11
    }

    /// Relative frequencies [p00, p01, p10, p11]; all zero without pairs
    pub fn proportions(&self) -> [f64; 4] {
        let total = self.total();
        if total == 0 {
            return [0.0; 4];
        }
        let t = total as f64;
        [
            self.n00 as f64 / t,
            self.n01 as f64 / t,
            self.n10 as f64 / t,
            self.n11 as f64 / t,
        ]
    }
}

/// Contagion index with the adjacency statistics it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContagionIndex {
    pub counts: AdjacencyCounts,
    pub p00: f64,
    pub p01: f64,
    pub p10: f64,
    pub p11: f64,
    /// RC2 in [0, 1]
    pub value: f64,
}

impl ContagionIndex {
    pub fn compute(mask: &BinaryMask, neighborhood: Neighborhood) -> Self {
        let counts = AdjacencyCounts::tally(mask, neighborhood);
        let [p00, p01, p10, p11] = counts.proportions();

        // A raster without any adjacent pair (1x1 or empty) is treated as homogeneous
        let value = if counts.total() == 0 {
            1.0
        } else {
            let entropy = entropy_term(p00) + entropy_term(p01) + entropy_term(p10) + entropy_term(p11);
            (1.0 + entropy / (2.0 * LN_2)).clamp(0.0, 1.0)
        };

        Self { counts, p00, p01, p10, p11, value }
    }
}

/// Queen-neighbourhood contagion index
pub fn contagion_index(mask: &BinaryMask) -> f64 {
    ContagionIndex::compute(mask, Neighborhood::Queen).value
}

fn entropy_term(p: f64) -> f64 {
    if p > 0.0 {
        p * p.ln()
    } else {
        0.0
    }
}
