//! Single-octave value noise.

use super::{Axis, ValueAndDerivative, ValueField};
use crate::core::{Error, Result};
use crate::math::hash::{hash2, unit_f32};
use crate::math::scalar::{floor_i32, mix, smooth, smooth_derivative};

/// Square lattice where every grid point carries a pseudo-random value in
/// `[-amplitude, amplitude)`; values between grid points are interpolated
/// with a smoothstep-weighted bilinear blend.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueGrid {
    seed: i64,
    cell_size: f64,
    reciprocal_size: f64,
    amplitude: f32,
}

impl ValueGrid {
    pub fn new(seed: i64, cell_size: f64, amplitude: f32) -> Result<Self> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(Error::InvalidParameter(format!("cell size must be positive, got {cell_size}")));
        }
        if !(amplitude > 0.0 && amplitude.is_finite()) {
            return Err(Error::InvalidParameter(format!("amplitude must be positive, got {amplitude}")));
        }
        Ok(Self {
            seed,
            cell_size,
            reciprocal_size: 1.0 / cell_size,
            amplitude,
        })
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Distance between grid points.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Unscaled lattice value in `[-1, 1)`.
    #[inline]
    pub fn raw_value(&self, gx: i32, gy: i32) -> f32 {
        unit_f32(hash2(self.seed, gx, gy))
    }

    /// Containing grid index and fractional position within that cell.
    #[inline]
    fn locate(&self, v: f64) -> (i32, f32) {
        let grid = floor_i32(v * self.reciprocal_size);
        let frac = ((v - grid as f64 * self.cell_size) * self.reciprocal_size) as f32;
        (grid, frac)
    }

    #[inline]
    fn lerp_y(&self, gx: i32, gy0: i32, smooth_y: f32) -> f32 {
        mix(self.raw_value(gx, gy0), self.raw_value(gx, gy0 + 1), smooth_y) * self.amplitude
    }

    #[inline]
    fn lerp_x(&self, gx0: i32, gy: i32, smooth_x: f32) -> f32 {
        mix(self.raw_value(gx0, gy), self.raw_value(gx0 + 1, gy), smooth_x) * self.amplitude
    }

    /// Walks `frac` forward by `increment` per output slot. `across(g)` is the
    /// value already interpolated across the other axis at grid line `g`.
    fn walk(&self, mut grid: i32, mut frac: f32, increment: f32, out: &mut [f32], across: impl Fn(i32) -> f32) {
        let mut value0 = across(grid);
        grid += 1;
        let mut value1 = across(grid);
        let last = out.len() - 1;
        for (index, slot) in out.iter_mut().enumerate() {
            *slot += mix(value0, value1, smooth(frac));
            if index == last {
                break;
            }
            frac += increment;
            if frac >= 1.0 {
                frac -= 1.0;
                value0 = value1;
                grid += 1;
                value1 = across(grid);
            }
        }
    }
}

impl ValueField for ValueGrid {
    fn value(&self, x: f64, y: f64) -> f32 {
        let (x0, frac_x) = self.locate(x);
        let (y0, frac_y) = self.locate(y);
        let smooth_x = smooth(frac_x);
        let smooth_y = smooth(frac_y);

        let v00 = self.raw_value(x0, y0);
        let v01 = self.raw_value(x0, y0 + 1);
        let v10 = self.raw_value(x0 + 1, y0);
        let v11 = self.raw_value(x0 + 1, y0 + 1);

        mix(mix(v00, v01, smooth_y), mix(v10, v11, smooth_y), smooth_x) * self.amplitude
    }

    fn value_and_derivative(&self, x: f64, y: f64, out: &mut ValueAndDerivative) {
        let (x0, frac_x) = self.locate(x);
        let (y0, frac_y) = self.locate(y);
        let smooth_x = smooth(frac_x);
        let smooth_y = smooth(frac_y);

        let v00 = self.raw_value(x0, y0);
        let v01 = self.raw_value(x0, y0 + 1);
        let v10 = self.raw_value(x0 + 1, y0);
        let v11 = self.raw_value(x0 + 1, y0 + 1);

        // Edges interpolated along one axis; the derivative along the other
        // axis is their difference times the smoothstep slope.
        let px0 = mix(v00, v01, smooth_y);
        let px1 = mix(v10, v11, smooth_y);
        let py0 = mix(v00, v10, smooth_x);
        let py1 = mix(v01, v11, smooth_x);

        let derivative_scale = self.amplitude * self.reciprocal_size as f32;
        out.dx += (px1 - px0) * smooth_derivative(frac_x) * derivative_scale;
        out.dy += (py1 - py0) * smooth_derivative(frac_y) * derivative_scale;
        out.value += mix(px0, px1, smooth_x) * self.amplitude;
    }

    fn values_along(&self, x: f64, y: f64, axis: Axis, step: f64, out: &mut [f32]) -> Result<()> {
        if step > self.cell_size {
            return Err(Error::StepTooLarge { step, cell_size: self.cell_size });
        }
        if !(step >= 0.0) {
            return Err(Error::InvalidParameter(format!("step size must be non-negative, got {step}")));
        }
        if out.is_empty() {
            return Ok(());
        }

        let increment = (self.reciprocal_size * step) as f32;
        match axis {
            Axis::X => {
                let (gx, frac_x) = self.locate(x);
                let (y0, frac_y) = self.locate(y);
                let smooth_y = smooth(frac_y);
                self.walk(gx, frac_x, increment, out, |g| self.lerp_y(g, y0, smooth_y));
            }
            Axis::Y => {
                let (x0, frac_x) = self.locate(x);
                let (gy, frac_y) = self.locate(y);
                let smooth_x = smooth(frac_x);
                self.walk(gy, frac_y, increment, out, |g| self.lerp_x(x0, g, smooth_x));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ValueGrid {
        ValueGrid::new(42, 64.0, 0.5).unwrap()
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(ValueGrid::new(1, 0.0, 1.0).is_err());
        assert!(ValueGrid::new(1, -4.0, 1.0).is_err());
        assert!(ValueGrid::new(1, 4.0, 0.0).is_err());
        assert!(ValueGrid::new(1, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_lattice_point_is_raw_value() {
        let grid = grid();
        let expected = unit_f32(hash2(42, 0, 0)) * 0.5;
        assert_eq!(grid.value(0.0, 0.0), expected);
        // Other lattice points behave the same way.
        assert_eq!(grid.value(128.0, -64.0), grid.raw_value(2, -1) * 0.5);
    }

    #[test]
    fn test_deterministic() {
        let a = grid();
        let b = grid();
        for i in 0..100 {
            let x = i as f64 * 13.7 - 500.0;
            let y = i as f64 * -7.3 + 40.0;
            assert_eq!(a.value(x, y).to_bits(), b.value(x, y).to_bits());
            assert_eq!(a.value(x, y).to_bits(), a.value(x, y).to_bits());
        }
    }

    #[test]
    fn test_deterministic_across_threads() {
        let grid = std::sync::Arc::new(grid());
        let expected: Vec<u32> = (0..200).map(|i| grid.value(i as f64 * 3.1, i as f64 * 1.7).to_bits()).collect();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let grid = grid.clone();
                std::thread::spawn(move || {
                    (0..200).map(|i| grid.value(i as f64 * 3.1, i as f64 * 1.7).to_bits()).collect::<Vec<u32>>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_value_within_amplitude() {
        let grid = grid();
        for i in -200..200 {
            let v = grid.value(i as f64 * 5.3, i as f64 * 2.9);
            assert!(v.abs() <= 0.5, "value {v} exceeds amplitude");
        }
    }

    #[test]
    fn test_bulk_matches_point_queries() {
        let grid = grid();
        for &(axis, step) in &[(Axis::X, 1.0), (Axis::X, 7.25), (Axis::Y, 1.0), (Axis::Y, 64.0)] {
            let (x, y) = (-130.4, 77.9);
            let mut bulk = vec![0.0f32; 300];
            grid.values_along(x, y, axis, step, &mut bulk).unwrap();
            for (i, &v) in bulk.iter().enumerate() {
                let offset = i as f64 * step;
                let expected = match axis {
                    Axis::X => grid.value(x + offset, y),
                    Axis::Y => grid.value(x, y + offset),
                };
                assert!((v - expected).abs() < 1e-4, "{axis:?} step {step} index {i}: {v} vs {expected}");
            }
        }
    }

    #[test]
    fn test_bulk_accumulates() {
        let grid = grid();
        let mut out = vec![1.0f32; 16];
        grid.values_x(10.0, 20.0, 2.0, &mut out).unwrap();
        for (i, &v) in out.iter().enumerate() {
            let expected = 1.0 + grid.value(10.0 + i as f64 * 2.0, 20.0);
            assert!((v - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_bulk_step_too_large() {
        let grid = grid();
        let mut out = vec![0.0f32; 4];
        let err = grid.values_x(0.0, 0.0, 64.5, &mut out).unwrap_err();
        assert!(matches!(err, Error::StepTooLarge { .. }));
        // Output untouched on error.
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_bulk_empty_output() {
        let grid = grid();
        let mut out: [f32; 0] = [];
        assert!(grid.values_y(0.0, 0.0, 1.0, &mut out).is_ok());
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let grid = grid();
        let h = 0.01;
        for i in 0..50 {
            let x = i as f64 * 11.3 - 200.0;
            let y = i as f64 * 4.1 + 13.0;
            let mut out = ValueAndDerivative::default();
            grid.value_and_derivative(x, y, &mut out);

            let fd_x = (grid.value(x + h, y) - grid.value(x - h, y)) as f64 / (2.0 * h);
            let fd_y = (grid.value(x, y + h) - grid.value(x, y - h)) as f64 / (2.0 * h);
            assert!((out.value - grid.value(x, y)).abs() < 1e-6);
            assert!((out.dx as f64 - fd_x).abs() < 1e-4, "dx {} vs {}", out.dx, fd_x);
            assert!((out.dy as f64 - fd_y).abs() < 1e-4, "dy {} vs {}", out.dy, fd_y);
        }
    }

    #[test]
    fn test_derivative_accumulates() {
        let grid = grid();
        let mut once = ValueAndDerivative::default();
        grid.value_and_derivative(33.0, -12.0, &mut once);
        let mut twice = ValueAndDerivative::default();
        grid.value_and_derivative(33.0, -12.0, &mut twice);
        grid.value_and_derivative(33.0, -12.0, &mut twice);
        assert!((twice.value - 2.0 * once.value).abs() < 1e-6);
        assert!((twice.dx - 2.0 * once.dx).abs() < 1e-6);
        assert!((twice.dy - 2.0 * once.dy).abs() < 1e-6);
    }
}
