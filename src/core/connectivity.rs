//! Run-length connectivity of a binary mask.
//!
//! The section length ratio compares the mean longest run of set pixels per row
//! and per column with the raster dimensions. A compact blob scores close to 1,
//! scattered speckle close to `2 / (w + h)`.

use ndarray::{ArrayView1, Axis};
use serde::Serialize;

use crate::types::BinaryMask;

/// Connectivity descriptors of one mask
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ConnectivityMetric {
    /// Mean over rows of the longest horizontal run
    pub mean_max_run_length_h: f64,
    /// Mean over columns of the longest vertical run
    pub mean_max_run_length_v: f64,
    /// (mean_h + mean_v) / (width + height)
    pub section_length_ratio: f64,
    /// Number of set pixels
    pub occupied_count: usize,
    /// Set pixels with 1 to 3 set 4-neighbours
    pub border_count: usize,
    /// Set pixels whose 4 neighbours are all set
    pub interior_count: usize,
    /// Sum of set 4-neighbours over all set pixels
    pub connection_count: usize,
    /// connection_count / (4 * width * height)
    pub connection_ratio: f64,
    /// 2 - interior / (interior + border); 2.0 without interior pixels
    pub fractal_index: f64,
}

impl ConnectivityMetric {
    /// Compute all descriptors. Neighbours outside the raster count as set.
    pub fn compute(mask: &BinaryMask) -> Self {
        let (height, width) = mask.dim();
        if width == 0 || height == 0 {
            return Self {
                fractal_index: 2.0,
                ..Self::default()
            };
        }

        let is_set = |y: usize, x: usize| mask[[y, x]] != 0;

        let mut occupied_count = 0;
        let mut border_count = 0;
        let mut interior_count = 0;
        let mut connection_count = 0;

        for ((y, x), &value) in mask.indexed_iter() {
            if value == 0 {
                continue;
            }
            let neighbours = [
                y == 0 || is_set(y - 1, x),
                y + 1 >= height || is_set(y + 1, x),
                x == 0 || is_set(y, x - 1),
                x + 1 >= width || is_set(y, x + 1),
            ];
            let n = neighbours.iter().filter(|&&set| set).count();

            occupied_count += 1;
            connection_count += n;
            match n {
                4 => interior_count += 1,
                1..=3 => border_count += 1,
                _ => {}
            }
        }

        let mean_h = mean_max_run_length(mask, Axis(0));
        let mean_v = mean_max_run_length(mask, Axis(1));

        let fractal_index = if interior_count > 0 {
            2.0 - interior_count as f64 / (interior_count + border_count) as f64
        } else {
            2.0
        };

        Self {
            mean_max_run_length_h: mean_h,
            mean_max_run_length_v: mean_v,
            section_length_ratio: (mean_h + mean_v) / (width + height) as f64,
            occupied_count,
            border_count,
            interior_count,
            connection_count,
            connection_ratio: connection_count as f64 / (4 * width * height) as f64,
            fractal_index,
        }
    }
}

/// Section length ratio in [0, 1]; 0 for an empty raster
pub fn section_length_ratio(mask: &BinaryMask) -> f64 {
    ConnectivityMetric::compute(mask).section_length_ratio
}

/// Mean longest run over the lanes produced by iterating `axis`.
///
/// `Axis(0)` walks rows and measures horizontal runs, `Axis(1)` walks columns.
fn mean_max_run_length(mask: &BinaryMask, axis: Axis) -> f64 {
    let lanes = mask.len_of(axis);
    if lanes == 0 {
        return 0.0;
    }
    let total: usize = mask.axis_iter(axis).map(longest_run).sum();
    total as f64 / lanes as f64
}

fn longest_run(lane: ArrayView1<u8>) -> usize {
    let mut best = 0;
    let mut current = 0;
    // Trailing zero flushes a run that touches the far edge
    for &value in lane.iter().chain(std::iter::once(&0u8)) {
        if value != 0 {
            current += 1;
        } else {
            best = best.max(current);
            current = 0;
        }
    }
    best
}
