//! Procedural scalar fields derived from hashed lattice coordinates.
//!
//! Nothing here stores grid values: every lattice value is recomputed from
//! `(seed, gx, gy)` on demand, so fields cost O(1) memory, extend forever and
//! can be shared across rendering threads without locking.

pub mod value_grid;
pub mod noise_grid;
pub mod voronoi;

pub use value_grid::ValueGrid;
pub use noise_grid::NoiseGrid;
pub use voronoi::{SeedPointQuery, VoronoiGrid};

use crate::core::Result;

/// Direction of a bulk line query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Accumulator for [`ValueField::value_and_derivative`].
///
/// Queries *add* into this holder so several fields can be stacked
/// without intermediate storage. Reset it between unrelated queries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ValueAndDerivative {
    pub value: f32,
    /// ∂value/∂x
    pub dx: f32,
    /// ∂value/∂y
    pub dy: f32,
}

impl ValueAndDerivative {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Query surface shared by [`ValueGrid`] and [`NoiseGrid`].
pub trait ValueField {
    /// Field value at `(x, y)`.
    fn value(&self, x: f64, y: f64) -> f32;

    /// Adds the value and both partial derivatives at `(x, y)` into `out`.
    fn value_and_derivative(&self, x: f64, y: f64, out: &mut ValueAndDerivative);

    /// Adds `out.len()` values into `out`, starting at `(x, y)` and stepping
    /// `step` along `axis` each time.
    ///
    /// Equivalent to calling [`ValueField::value`] at every step, but only
    /// re-hashes lattice values when the walk crosses a cell boundary.
    /// `step` must not exceed the cell size of any layer.
    fn values_along(&self, x: f64, y: f64, axis: Axis, step: f64, out: &mut [f32]) -> Result<()>;

    fn values_x(&self, x: f64, y: f64, step: f64, out: &mut [f32]) -> Result<()> {
        self.values_along(x, y, Axis::X, step, out)
    }

    fn values_y(&self, x: f64, y: f64, step: f64, out: &mut [f32]) -> Result<()> {
        self.values_along(x, y, Axis::Y, step, out)
    }
}
