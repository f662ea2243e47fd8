//! Procedural rock shape: a noise heightfield pushed up in the middle and
//! down at the rim, with a Voronoi crack pattern for the fracture animation.
//!
//! Three coordinate spaces are involved. Absolute space is shared by every
//! entity. Relative space is absolute space translated so the rock sits at
//! the origin. Rotated space is relative space turned by the rock's
//! rotation; the height noise and fracture pattern are sampled there.
//! Public queries take relative coordinates.

use glam::Vec3;

use crate::core::config::RockSpawnParams;
use crate::core::{Error, Result};
use crate::field::{NoiseGrid, SeedPointQuery, ValueAndDerivative, ValueField, VoronoiGrid};
use crate::math::{Curve, SeedStream};

use super::fracture::in_crack;

/// Outward-facing steepening applied to the gradient before normalizing.
/// Lattice cells start at 64 pixels, which makes the raw surface very flat.
const NORMAL_STEEPNESS: f32 = -8.0;

/// Lifecycle of a rock. Only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RockState {
    /// Integrity above zero; collides and renders whole.
    Solid,
    /// Integrity exhausted; cracks widen as fracture progress grows.
    Fracturing,
    /// Fracture finished.
    Destroyed,
}

/// Random rolls that define a rock.
#[derive(Clone, Debug, PartialEq)]
pub struct RockParams {
    /// Nominal radius; the height bias reaches -1 at this distance.
    pub size: f64,
    pub integrity: f64,
    pub height_seed: i64,
    pub fracture_seed: i64,
    /// Tint in `[0, 1)`.
    pub brightness: f32,
    /// Starting rotation in radians.
    pub rotation: f64,
    /// Radians per second.
    pub rotation_speed: f64,
}

impl RockParams {
    /// Roll a rock. `size_limit` in `[0, 1]` caps how far up the size curve
    /// the roll may reach.
    pub fn roll(stream: &mut SeedStream, spawn: &RockSpawnParams, size_limit: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&size_limit) {
            return Err(Error::InvalidParameter(format!("size limit must be within [0, 1], got {size_limit}")));
        }
        if !(spawn.min_size > 0.0 && spawn.max_size >= spawn.min_size) {
            return Err(Error::InvalidParameter(format!(
                "rock size range [{}, {}] is invalid",
                spawn.min_size, spawn.max_size
            )));
        }

        let size = Curve::exponential(spawn.min_size, spawn.max_size).interpolate(stream.next_f64() * size_limit);
        let height_seed = stream.next_seed();
        let fracture_seed = stream.next_seed();
        let brightness = stream.next_f32();
        let rotation = stream.next_f64() * std::f64::consts::TAU;
        let rotation_speed = (stream.next_f64() * 128.0 - 64.0) / size;

        Ok(Self {
            size,
            integrity: size * size * spawn.integrity_per_area,
            height_seed,
            fracture_seed,
            brightness,
            rotation,
            rotation_speed,
        })
    }
}

/// Heightfield, crack pattern and damage state of one rock.
#[derive(Clone, Debug)]
pub struct RockShape {
    height: NoiseGrid,
    fracture: VoronoiGrid,
    size: f64,
    reciprocal_size: f64,
    rotation: f64,
    sin_rotation: f64,
    cos_rotation: f64,
    integrity: f64,
    fracture_progress: f64,
    fracture_duration: f64,
}

impl RockShape {
    pub fn new(height: NoiseGrid, fracture: VoronoiGrid, size: f64, integrity: f64, fracture_duration: f64) -> Result<Self> {
        if !(size > 0.0 && size.is_finite()) {
            return Err(Error::InvalidParameter(format!("rock size must be positive, got {size}")));
        }
        if !(fracture_duration > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "fracture duration must be positive, got {fracture_duration}"
            )));
        }
        Ok(Self {
            height,
            fracture,
            size,
            reciprocal_size: 1.0 / size,
            rotation: 0.0,
            sin_rotation: 0.0,
            cos_rotation: 1.0,
            integrity,
            fracture_progress: 0.0,
            fracture_duration,
        })
    }

    /// Build the fields described by `params` using the layout in `spawn`.
    pub fn from_params(params: &RockParams, spawn: &RockSpawnParams) -> Result<Self> {
        let height = NoiseGrid::octaves(
            params.height_seed,
            spawn.noise_cell_size,
            spawn.noise_size_factor,
            spawn.noise_amplitude,
            spawn.noise_amplitude_factor,
            spawn.noise_layers,
        )?;
        let fracture = VoronoiGrid::new(
            params.fracture_seed,
            params.size * spawn.fracture_cell_fraction,
            spawn.fracture_jitter,
        )?;
        let mut shape = Self::new(height, fracture, params.size, params.integrity, spawn.fracture_duration)?;
        shape.set_rotation(params.rotation);
        Ok(shape)
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn integrity(&self) -> f64 {
        self.integrity
    }

    /// 0 while solid, rising to 1 as the rock breaks apart.
    pub fn fracture_progress(&self) -> f64 {
        self.fracture_progress
    }

    pub fn height_noise(&self) -> &NoiseGrid {
        &self.height
    }

    pub fn fracture_grid(&self) -> &VoronoiGrid {
        &self.fracture
    }

    /// Fresh query for the fracture grid, one per rendering thread.
    pub fn new_query(&self) -> SeedPointQuery {
        self.fracture.new_query()
    }

    pub fn state(&self) -> RockState {
        if self.integrity > 0.0 {
            RockState::Solid
        } else if self.fracture_progress < 1.0 {
            RockState::Fracturing
        } else {
            RockState::Destroyed
        }
    }

    pub fn set_rotation(&mut self, angle: f64) {
        self.rotation = angle;
        (self.sin_rotation, self.cos_rotation) = angle.sin_cos();
    }

    pub fn add_rotation(&mut self, angle: f64) {
        self.set_rotation(self.rotation + angle);
    }

    /// Remove `amount` integrity. Negative amounts are ignored.
    pub fn damage(&mut self, amount: f64) -> RockState {
        let before = self.state();
        self.integrity -= amount.max(0.0);
        self.log_transition(before)
    }

    /// Advance the fracture animation by `delta_seconds`. Has no effect
    /// until integrity is exhausted.
    pub fn advance_fracture(&mut self, delta_seconds: f64) -> RockState {
        let before = self.state();
        if before == RockState::Fracturing {
            let step = delta_seconds.max(0.0) / self.fracture_duration;
            self.fracture_progress = (self.fracture_progress + step).min(1.0);
        }
        self.log_transition(before)
    }

    fn log_transition(&self, before: RockState) -> RockState {
        let after = self.state();
        if after != before {
            log::debug!("Rock (size {:.1}) {:?} -> {:?}", self.size, before, after);
        }
        after
    }

    /// Relative coordinates to rotated coordinates.
    #[inline]
    pub fn to_rotated(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.cos_rotation - y * self.sin_rotation,
            x * self.sin_rotation + y * self.cos_rotation,
        )
    }

    /// Paraboloid: 1 at the center, -1 at distance `size`. Rotationally
    /// symmetric, so relative and rotated coordinates give the same result.
    #[inline]
    pub fn height_bias(&self, x: f64, y: f64) -> f32 {
        let (u, v) = (x * self.reciprocal_size, y * self.reciprocal_size);
        1.0 - 2.0 * (u * u + v * v) as f32
    }

    /// Biased height at a relative position. Positive means inside the rock.
    pub fn height_at(&self, x: f64, y: f64) -> f32 {
        let (rx, ry) = self.to_rotated(x, y);
        self.height.value(rx, ry) + self.height_bias(rx, ry)
    }

    /// Collision test at a relative position. Always false once integrity
    /// is exhausted.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.integrity > 0.0 && self.height_at(x, y) > 0.0
    }

    /// Unit surface normal at a relative position, or `None` outside the
    /// rock or on a crack.
    ///
    /// `x` and `y` are the outward-facing gradient in relative space. `z` is
    /// the biased height rather than 1, which tilts the normal further
    /// outward toward the rim.
    pub fn surface_normal(&self, x: f64, y: f64, query: &mut SeedPointQuery) -> Option<Vec3> {
        let (rx, ry) = self.to_rotated(x, y);
        let mut sample = ValueAndDerivative::default();
        self.height.value_and_derivative(rx, ry, &mut sample);
        sample.value += self.height_bias(rx, ry);
        if sample.value <= 0.0 || self.is_in_crack(rx, ry, query) {
            return None;
        }

        let (sin, cos) = (self.sin_rotation, self.cos_rotation);
        let dx = sample.dy as f64 * sin + sample.dx as f64 * cos;
        let dy = sample.dy as f64 * cos - sample.dx as f64 * sin;

        let bias_slope = 4.0 * self.reciprocal_size * self.reciprocal_size;
        let dx = (dx as f32 - (x * bias_slope) as f32) * NORMAL_STEEPNESS;
        let dy = (dy as f32 - (y * bias_slope) as f32) * NORMAL_STEEPNESS;

        Some(Vec3::new(dx, dy, sample.value).normalize())
    }

    /// Crack test in rotated space. Never cracked while solid.
    pub fn is_in_crack(&self, rx: f64, ry: f64, query: &mut SeedPointQuery) -> bool {
        self.integrity <= 0.0 && in_crack(&self.fracture, self.fracture_progress, rx, ry, query)
    }
}
