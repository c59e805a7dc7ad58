//! Clumpiness index (CLUMPY, McGarigal & Marks, FRAGSTATS) of the inside class.
//!
//! ```text
//! G      = g_ii / (4 A - P_min(A))        like adjacencies over their maximum
//! CLUMPY = (G - P) / P         if G < P
//!          (G - P) / (1 - P)   otherwise
//! ```
//!
//! `g_ii` counts ordered rook adjacencies between inside pixels, `A` is the inside
//! area in pixels, `P` the inside proportion and `P_min` the minimum perimeter of a
//! patch of `A` square cells.

use serde::Serialize;

use crate::core::contagion::{AdjacencyCounts, Neighborhood};
use crate::types::BinaryMask;

/// Aggregation descriptors of the inside class
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AggregationMetrics {
    pub inside_count: usize,
    /// Inside proportion P
    pub proportion: f64,
    /// G, like adjacencies relative to the maximum possible
    pub like_adjacency_ratio: f64,
    /// CLUMPY in [-1, 1]
    pub clumpiness: f64,
}

impl AggregationMetrics {
    pub fn compute(mask: &BinaryMask) -> Self {
        let total = mask.len();
        let counts = AdjacencyCounts::tally(mask, Neighborhood::Rook);
        let inside_count = mask.iter().filter(|&&v| v != 0).count();

        if total == 0 || inside_count == 0 {
            return Self::default();
        }
        let proportion = inside_count as f64 / total as f64;
        if inside_count == total {
            return Self {
                inside_count,
                proportion,
                like_adjacency_ratio: 1.0,
                clumpiness: 1.0,
            };
        }

        // A single inside pixel has no possible like adjacency and is scored as isolated
        let max_like = 4 * inside_count - min_perimeter(inside_count);
        let g = if max_like == 0 {
            0.0
        } else {
            counts.n11 as f64 / max_like as f64
        };

        let clumpiness = if g < proportion {
            (g - proportion) / proportion
        } else {
            (g - proportion) / (1.0 - proportion)
        };

        Self {
            inside_count,
            proportion,
            like_adjacency_ratio: g,
            clumpiness: clumpiness.clamp(-1.0, 1.0),
        }
    }
}

/// CLUMPY of the inside class; 0 for an empty mask, 1 for a full one, -1 for a lone pixel
pub fn clumpiness(mask: &BinaryMask) -> f64 {
    AggregationMetrics::compute(mask).clumpiness
}

/// Minimum perimeter (in cell edges) of a patch of `area` square cells
pub fn min_perimeter(area: usize) -> usize {
    let n = integer_sqrt(area);
    if area == n * n {
        4 * n
    } else if area <= n * (n + 1) {
        4 * n + 2
    } else {
        4 * n + 4
    }
}

fn integer_sqrt(v: usize) -> usize {
    let mut n = (v as f64).sqrt() as usize;
    while n * n > v {
        n -= 1;
    }
    while (n + 1) * (n + 1) <= v {
        n += 1;
    }
    n
}
