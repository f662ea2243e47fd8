//! Jittered-grid Voronoi diagram.
//!
//! One seed point per grid cell, displaced inside its cell by a hashed
//! offset scaled by `jitter`. Nearest-seed queries scan the 3×3 cells around
//! the query point. With high jitter the true nearest seed can lie outside
//! that neighbourhood; the occasional wrong cell is not visible in practice
//! and is left as is.

use glam::{DVec2, IVec2};

use crate::core::{Error, Result};
use crate::math::hash::{hash2, unit_f64_positive};
use crate::math::scalar::{floor_i32, square2};

const SEED_X_SALT: i64 = 0xC83D_4C19_D8F1_2EA4_u64 as i64;
const SEED_Y_SALT: i64 = 0x6494_F493_9AFE_C67F_u64 as i64;

/// Voronoi diagram with seed points on a jittered square grid.
#[derive(Clone, Debug, PartialEq)]
pub struct VoronoiGrid {
    seed: i64,
    cell_size: f64,
    reciprocal_size: f64,
    jitter: f64,
}

impl VoronoiGrid {
    pub fn new(seed: i64, cell_size: f64, jitter: f64) -> Result<Self> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(Error::InvalidParameter(format!("cell size must be positive, got {cell_size}")));
        }
        if !(0.0..=1.0).contains(&jitter) {
            return Err(Error::InvalidParameter(format!("jitter must be within [0, 1], got {jitter}")));
        }
        Ok(Self {
            seed,
            cell_size,
            reciprocal_size: 1.0 / cell_size,
            jitter,
        })
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn seed_point_x(&self, gx: i32, gy: i32) -> f64 {
        let bits = hash2(self.seed ^ SEED_X_SALT, gx, gy);
        (gx as f64 + unit_f64_positive(bits) * self.jitter) * self.cell_size
    }

    pub fn seed_point_y(&self, gx: i32, gy: i32) -> f64 {
        let bits = hash2(self.seed ^ SEED_Y_SALT, gx, gy);
        (gy as f64 + unit_f64_positive(bits) * self.jitter) * self.cell_size
    }

    /// Seed point of the given cell.
    pub fn seed_point(&self, cell: IVec2) -> DVec2 {
        DVec2::new(self.seed_point_x(cell.x, cell.y), self.seed_point_y(cell.x, cell.y))
    }

    /// Cell containing `(x, y)`.
    pub fn cell_at(&self, x: f64, y: f64) -> IVec2 {
        IVec2::new(floor_i32(x * self.reciprocal_size), floor_i32(y * self.reciprocal_size))
    }

    /// Fresh query cache bound to this grid.
    pub fn new_query(&self) -> SeedPointQuery {
        SeedPointQuery {
            grid_key: self.key(),
            ..SeedPointQuery::default()
        }
    }

    fn key(&self) -> (i64, u64) {
        (self.seed, self.cell_size.to_bits())
    }

    /// Store the seed point nearest to `(x, y)` in `query`.
    ///
    /// When the previous answer held in `query` is provably still correct
    /// for `(x, y)` the query is left untouched and no hashing happens.
    pub fn nearest_seed_point(&self, x: f64, y: f64, query: &mut SeedPointQuery) {
        debug_assert_eq!(query.grid_key, self.key(), "seed point query used with the wrong grid");
        if query.safe_distance_squared > 0.0
            && self.cell_at(x, y) == query.scan_cell
            && square2(x - query.center.x, y - query.center.y) < query.safe_distance_squared
        {
            return;
        }
        self.rescan(x, y, query);
    }

    /// Full 3×3 neighbourhood scan, ignoring any cached answer.
    pub fn rescan(&self, x: f64, y: f64, query: &mut SeedPointQuery) {
        let center_cell = self.cell_at(x, y);

        let mut candidates = [(IVec2::ZERO, DVec2::ZERO); 9];
        candidates[0] = (center_cell, self.seed_point(center_cell));
        let mut count = 1;
        for gx in center_cell.x - 1..=center_cell.x + 1 {
            for gy in center_cell.y - 1..=center_cell.y + 1 {
                let cell = IVec2::new(gx, gy);
                if cell == center_cell {
                    continue;
                }
                candidates[count] = (cell, self.seed_point(cell));
                count += 1;
            }
        }

        let mut nearest = 0;
        let mut nearest_distance = square2(x - candidates[0].1.x, y - candidates[0].1.y);
        for (index, &(_, point)) in candidates.iter().enumerate().skip(1) {
            let distance = square2(x - point.x, y - point.y);
            if distance < nearest_distance {
                nearest = index;
                nearest_distance = distance;
            }
        }

        // Any point closer to the winner than half the distance to the
        // winner's closest rival scanned here is nearer to the winner than
        // to every rival, so the answer holds for it too.
        let (cell, center) = candidates[nearest];
        let closest_rival = candidates
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != nearest)
            .map(|(_, &(_, point))| square2(point.x - center.x, point.y - center.y))
            .fold(f64::INFINITY, f64::min);

        query.cell = cell;
        query.center = center;
        query.scan_cell = center_cell;
        query.safe_distance_squared = closest_rival * 0.25;
    }
}

/// Mutable cache for [`VoronoiGrid::nearest_seed_point`].
///
/// Owned per query site (one per rendering thread or per call), never shared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeedPointQuery {
    cell: IVec2,
    center: DVec2,
    /// Cell the last full scan was centered on.
    scan_cell: IVec2,
    /// 0 until the first scan.
    safe_distance_squared: f64,
    grid_key: (i64, u64),
}

impl SeedPointQuery {
    /// Grid cell owning the nearest seed point.
    pub fn cell(&self) -> IVec2 {
        self.cell
    }

    /// Position of the nearest seed point.
    pub fn center(&self) -> DVec2 {
        self.center
    }

    /// Squared radius around `center` within which the cached answer is
    /// reused. 0 until the first scan.
    pub fn safe_distance_squared(&self) -> f64 {
        self.safe_distance_squared
    }

    /// Point this query at a specific cell and drop the cache.
    pub fn set_cell(&mut self, grid: &VoronoiGrid, cell: IVec2) {
        debug_assert_eq!(self.grid_key, grid.key(), "seed point query used with the wrong grid");
        self.cell = cell;
        self.center = grid.seed_point(cell);
        self.safe_distance_squared = 0.0;
    }

    pub fn invalidate(&mut self) {
        self.safe_distance_squared = 0.0;
    }
}
