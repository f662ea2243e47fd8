//! Interpolation curves mapping a fraction in `[0, 1]` onto an output range.
//!
//! Used to turn discrete upgrade counts into continuous values and to map
//! uniform random rolls onto sizes.

use serde::{Deserialize, Serialize};

/// Output range plus the shape of the mapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    /// `min + frac * (max - min)`
    Linear { min: f64, max: f64 },
    /// Linear in log space. Both ends must be positive.
    Exponential { min: f64, max: f64 },
}

impl Curve {
    pub fn linear(min: f64, max: f64) -> Self {
        Self::Linear { min, max }
    }

    pub fn exponential(min: f64, max: f64) -> Self {
        debug_assert!(min > 0.0 && max > 0.0, "exponential curve needs positive bounds");
        Self::Exponential { min, max }
    }

    /// Map `frac` onto the curve's range. Fractions outside `[0, 1]`
    /// extrapolate.
    pub fn interpolate(&self, frac: f64) -> f64 {
        match *self {
            Self::Linear { min, max } => frac * (max - min) + min,
            Self::Exponential { min, max } => {
                let log_min = min.ln();
                (frac * (max.ln() - log_min) + log_min).exp()
            }
        }
    }

    /// Map a count out of `max_count` (e.g. upgrades collected).
    pub fn at_count(&self, count: u32, max_count: u32) -> f64 {
        if max_count == 0 {
            return self.interpolate(0.0);
        }
        self.interpolate(count as f64 / max_count as f64)
    }
}
