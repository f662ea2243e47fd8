//! Crack test for fracturing rocks.
//!
//! Cracks are the edges of the rock's Voronoi pattern. As fracture progress
//! goes from 0 to 1 the cracks widen from nothing until they reach the seed
//! points and the rock is gone.

use glam::{DVec2, IVec2};

use crate::field::{SeedPointQuery, VoronoiGrid};

/// How far `point` lies from `center` toward the edge it shares with
/// `neighbor`: 0 at `center`, 1 on the bisector between the two seeds.
#[inline]
pub fn edge_fraction(point: DVec2, center: DVec2, neighbor: DVec2) -> f64 {
    let toward = neighbor - center;
    2.0 * (point - center).dot(toward) / toward.length_squared()
}

/// True if `(x, y)`, in the pattern's own space, lies on a crack of width
/// `progress`. Refreshes `query` to the seed nearest to the point.
///
/// Only the 8 cells around the nearest seed are checked, so an edge with a
/// seed further away is occasionally missed.
pub fn in_crack(grid: &VoronoiGrid, progress: f64, x: f64, y: f64, query: &mut SeedPointQuery) -> bool {
    grid.nearest_seed_point(x, y, query);
    let point = DVec2::new(x, y);
    let home = query.cell();
    let center = query.center();
    let threshold = 1.0 - progress;

    for gx in home.x - 1..=home.x + 1 {
        for gy in home.y - 1..=home.y + 1 {
            let cell = IVec2::new(gx, gy);
            if cell == home {
                continue;
            }
            if edge_fraction(point, center, grid.seed_point(cell)) > threshold {
                return true;
            }
        }
    }
    false
}
