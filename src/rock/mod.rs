//! Procedural rocks: shape, collision and the fracture animation.

pub mod fracture;
pub mod shape;

pub use shape::{RockParams, RockShape, RockState};

use glam::DVec2;

use crate::core::config::RockSpawnParams;
use crate::core::Result;
use crate::math::SeedStream;

/// A rock placed in the world.
#[derive(Clone, Debug)]
pub struct Rock {
    /// Center in absolute space.
    pub position: DVec2,
    /// Radians per second.
    pub rotation_speed: f64,
    /// Tint in `[0, 1)`; 0 renders darkest.
    pub brightness: f32,
    pub shape: RockShape,
}

impl Rock {
    pub fn new(position: DVec2, shape: RockShape, brightness: f32) -> Self {
        Self {
            position,
            rotation_speed: 0.0,
            brightness,
            shape,
        }
    }

    /// Roll a new rock at `position`.
    pub fn roll(position: DVec2, stream: &mut SeedStream, spawn: &RockSpawnParams, size_limit: f64) -> Result<Self> {
        let params = RockParams::roll(stream, spawn, size_limit)?;
        Ok(Self {
            position,
            rotation_speed: params.rotation_speed,
            brightness: params.brightness,
            shape: RockShape::from_params(&params, spawn)?,
        })
    }

    /// Spin and fracture by `delta_seconds`.
    pub fn advance(&mut self, delta_seconds: f64) -> RockState {
        self.shape.add_rotation(self.rotation_speed * delta_seconds);
        self.shape.advance_fracture(delta_seconds)
    }

    /// Collision test at an absolute position.
    pub fn contains_point(&self, point: DVec2) -> bool {
        let relative = point - self.position;
        self.shape.contains_point(relative.x, relative.y)
    }

    /// Whether any part of the rock can still be seen or hit.
    pub fn is_alive(&self) -> bool {
        self.shape.state() != RockState::Destroyed
    }
}
