//! Row partitioning for parallel dispatch.
//!
//! Rectangles split into runs of equal row count. Circles and ellipses
//! split at positions chosen so every band covers the same area, so that
//! threads with a constant-cost shader finish together.

use std::f64::consts::PI;

use crate::math::scalar::round_half_up;

/// Most shader threads a canvas accepts.
pub const MAX_THREADS: usize = 1024;

/// Newton iterations per slice position.
pub const NEWTON_ITERATIONS: usize = 6;

/// Fraction of a unit circle's area lying above the horizontal line at
/// `t`, where `t` runs from 0 (top) to 1 (bottom).
#[inline]
pub fn circle_area_fraction(t: f64) -> f64 {
    0.5 - ((1.0 - 2.0 * t).asin() + (2.0 - 4.0 * t) * (t * (1.0 - t)).sqrt()) / PI
}

/// Result of inverting [`circle_area_fraction`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliceSolve {
    pub position: f64,
    /// Size of the final Newton correction.
    pub last_step: f64,
}

/// Find `t` with `circle_area_fraction(t) == target`, starting from
/// `t = target`.
pub fn solve_slice_position(target: f64) -> SliceSolve {
    let mut result = target;
    let mut last_step = 0.0;
    for _ in 0..NEWTON_ITERATIONS {
        let common = (result * (1.0 - result)).sqrt();
        let value = 0.5 - ((1.0 - 2.0 * result).asin() + (2.0 - 4.0 * result) * common) / PI;
        let derivative = common * 8.0 / PI;
        last_step = (value - target) / derivative;
        result -= last_step;
    }
    SliceSolve {
        position: result,
        last_step: last_step.abs(),
    }
}

/// Equal-area band boundaries of a unit circle for one thread count.
///
/// Holds `thread_count + 1` positions: 0, the interior boundaries in
/// increasing order, then exactly 1.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleSlices {
    positions: Vec<f64>,
}

impl CircleSlices {
    pub fn new(thread_count: usize) -> Self {
        let thread_count = thread_count.max(1);
        let mut positions = Vec::with_capacity(thread_count + 1);
        positions.push(0.0);
        for slice in 1..thread_count {
            positions.push(solve_slice_position(slice as f64 / thread_count as f64).position);
        }
        positions.push(1.0);
        Self { positions }
    }

    pub fn thread_count(&self) -> usize {
        self.positions.len() - 1
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Row bands for a shape spanning rows `[min_y, max_y)`. Bands can be
    /// empty when there are more threads than rows.
    pub fn row_bands(&self, min_y: i32, max_y: i32) -> Vec<(i32, i32)> {
        let rows = (max_y - min_y) as f64;
        let edge = |position: f64| round_half_up(min_y as f64 + rows * position);
        self.positions.windows(2).map(|pair| (edge(pair[0]), edge(pair[1]))).collect()
    }
}

/// Split rows `[min_y, max_y)` into `min(thread_count, rows)` runs whose
/// lengths differ by at most one.
pub fn rect_row_bands(min_y: i32, max_y: i32, thread_count: usize) -> Vec<(i32, i32)> {
    let rows = (max_y - min_y).max(0) as i64;
    let threads = (thread_count.max(1) as i64).min(rows);
    (0..threads)
        .map(|slice| {
            let start = min_y as i64 + rows * slice / threads;
            let end = min_y as i64 + rows * (slice + 1) / threads;
            (start as i32, end as i32)
        })
        .collect()
}
