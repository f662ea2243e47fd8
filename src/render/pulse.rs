//! Plasma pulses: a glowing head with a tapering tail behind it.

use super::registry::Renderer;
use crate::core::{DVec2, Result, Vec3};
use crate::math::scalar::{smooth_f64, square2};
use crate::raster::pixel::f2i;
use crate::raster::{Canvas, shader_fn};
use crate::rock::Rock;

/// Tail length in head radii.
pub const TAIL_LENGTH: f64 = 4.0;

/// Power level at which the high-power colours are reached.
pub const MAX_FIRE_POWER: u32 = 4;

/// A projectile moving in a straight line.
#[derive(Clone, Debug, PartialEq)]
pub struct Pulse {
    pub position: DVec2,
    /// Unit vector, or zero for a stationary pulse.
    pub direction: DVec2,
    pub speed: f64,
    pub power_level: u32,
    /// Integrity removed from a rock on impact.
    pub damage: f64,
}

impl Pulse {
    pub fn new(position: DVec2, velocity: DVec2, power_level: u32, damage: f64) -> Self {
        let speed = velocity.length();
        let direction = if speed != 0.0 { velocity / speed } else { DVec2::ZERO };
        Self {
            position,
            direction,
            speed,
            power_level,
            damage,
        }
    }

    /// Head radius.
    pub fn size(&self) -> f64 {
        self.power_level as f64 * 4.0 + 8.0
    }

    /// Power level scaled to `[0, 1]`.
    pub fn power(&self) -> f32 {
        (self.power_level as f32 / MAX_FIRE_POWER as f32).min(1.0)
    }

    pub fn advance(&mut self, delta_seconds: f64) {
        self.position += self.direction * (self.speed * delta_seconds);
    }

    /// Hit `rock` if the pulse's position is inside it: damage it and spin
    /// it by how far off-center the hit landed. Returns whether it hit.
    pub fn strike(&self, rock: &mut Rock) -> bool {
        if !rock.contains_point(self.position) {
            return false;
        }
        rock.shape.damage(self.damage);
        let reciprocal_size = 1.0 / rock.shape.size();
        rock.rotation_speed += (self.position.x - rock.position.x) * self.damage * reciprocal_size * reciprocal_size;
        true
    }

    /// Center and radius of the circle enclosing head and tail.
    pub fn bounds(&self) -> (DVec2, f64) {
        let head = self.size();
        let center = self.position + self.direction * (head * (1.0 - TAIL_LENGTH) * 0.5);
        (center, head * ((TAIL_LENGTH - 1.0) * 0.5 + 1.0))
    }

    /// Glow intensity at `point`, or `None` where nothing is drawn.
    pub fn intensity_at(&self, point: DVec2) -> Option<f32> {
        let head = self.size();
        let offset = point - self.position;
        let forward = offset.dot(self.direction) / head;
        let sideways = (offset.x * self.direction.y - offset.y * self.direction.x) / head;
        intensity(forward, sideways)
    }
}

/// Glow intensity at a position measured in head radii along (`forward`)
/// and across (`sideways`) the direction of travel.
///
/// Ahead of the center the head is a disc fading with squared distance.
/// Behind it the tail narrows smoothly to nothing over [`TAIL_LENGTH`].
pub fn intensity(forward: f64, sideways: f64) -> Option<f32> {
    if forward >= 0.0 {
        let intensity = 1.0 - square2(forward, sideways).sqrt() as f32;
        (intensity > 0.0).then(|| intensity * intensity)
    } else {
        let thickness = 1.0 + forward * (1.0 / TAIL_LENGTH);
        if thickness <= 0.0 {
            return None;
        }
        let thickness = smooth_f64(thickness);
        let intensity = 1.0 - (sideways.abs() / thickness) as f32;
        (intensity > 0.0).then(|| intensity * intensity * thickness as f32)
    }
}

/// Colour ramps for pulses: edge to center by intensity, low to high by
/// power.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseColors {
    pub edge_low_power: Vec3,
    pub edge_high_power: Vec3,
    pub center_low_power: Vec3,
    pub center_high_power: Vec3,
}

impl PulseColors {
    pub const RED_YELLOW: Self = Self {
        edge_low_power: Vec3::new(1.0, 0.0, 0.0),
        edge_high_power: Vec3::new(1.0, 0.0, 0.0),
        center_low_power: Vec3::new(1.0, 0.25, 0.25),
        center_high_power: Vec3::new(1.0, 0.875, 0.5625),
    };

    pub const GREEN_YELLOW_CYAN_WHITE: Self = Self {
        edge_low_power: Vec3::new(0.25, 1.0, 0.25),
        edge_high_power: Vec3::new(0.25, 1.0, 1.0),
        center_low_power: Vec3::new(1.0, 1.0, 0.25),
        center_high_power: Vec3::new(1.0, 1.0, 1.0),
    };

    /// RGB in `[0, 1]`.
    pub fn get(&self, intensity: f32, power: f32) -> Vec3 {
        let edge = self.edge_low_power.lerp(self.edge_high_power, power);
        let center = self.center_low_power.lerp(self.center_high_power, power);
        edge.lerp(center, intensity)
    }
}

impl Default for PulseColors {
    fn default() -> Self {
        Self::RED_YELLOW
    }
}

/// Blends a [`Pulse`] onto the canvas with its intensity as alpha.
#[derive(Clone, Copy, Debug, Default)]
pub struct PulseRenderer {
    pub colors: PulseColors,
}

impl Renderer<Pulse> for PulseRenderer {
    fn render(&self, pulse: &Pulse, canvas: &mut Canvas) -> Result<()> {
        let (center, radius) = pulse.bounds();
        let power = pulse.power();
        let shader = shader_fn(|context| {
            let point = DVec2::new(context.x as f64, context.y as f64);
            if let Some(intensity) = pulse.intensity_at(point) {
                let color = self.colors.get(intensity, power);
                context
                    .pixel()
                    .blend_rgb(f2i(color.x), f2i(color.y), f2i(color.z), f2i(intensity));
            }
        });
        canvas.run_over_circle(center.x, center.y, radius, &shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RockSpawnParams;
    use crate::math::SeedStream;

    #[test]
    fn test_new_normalizes_velocity() {
        let pulse = Pulse::new(DVec2::ZERO, DVec2::new(0.0, -300.0), 2, 1.0);
        assert_eq!(pulse.direction, DVec2::new(0.0, -1.0));
        assert_eq!(pulse.speed, 300.0);
        assert_eq!(pulse.size(), 16.0);
        assert_eq!(pulse.power(), 0.5);

        let still = Pulse::new(DVec2::ZERO, DVec2::ZERO, 0, 1.0);
        assert_eq!(still.direction, DVec2::ZERO);
    }

    #[test]
    fn test_advance() {
        let mut pulse = Pulse::new(DVec2::new(10.0, 10.0), DVec2::new(3.0, 4.0), 0, 1.0);
        pulse.advance(2.0);
        assert!((pulse.position - DVec2::new(16.0, 18.0)).length() < 1e-12);
    }

    #[test]
    fn test_intensity_shape() {
        assert_eq!(intensity(0.0, 0.0), Some(1.0));
        assert_eq!(intensity(1.0, 0.0), None);
        assert_eq!(intensity(0.6, 0.9), None);
        let near = intensity(0.2, 0.0).unwrap();
        let far = intensity(0.6, 0.0).unwrap();
        assert!(near > far);
        // The tail fades out toward its end.
        let tail_near = intensity(-0.5, 0.0).unwrap();
        let tail_far = intensity(-3.5, 0.0).unwrap();
        assert!(tail_near > tail_far);
        assert_eq!(intensity(-TAIL_LENGTH, 0.0), None);
        assert_eq!(intensity(-1.0, 1.0), None);
    }

    #[test]
    fn test_bounds_enclose_head_and_tail() {
        let pulse = Pulse::new(DVec2::new(50.0, 50.0), DVec2::new(1.0, 0.0), 0, 1.0);
        let (center, radius) = pulse.bounds();
        assert_eq!(center, DVec2::new(38.0, 50.0));
        assert_eq!(radius, 20.0);
        // Head tip and tail end both touch the circle.
        assert_eq!((DVec2::new(58.0, 50.0) - center).length(), radius);
        assert_eq!((DVec2::new(18.0, 50.0) - center).length(), radius);
    }

    #[test]
    fn test_colors() {
        let colors = PulseColors::RED_YELLOW;
        assert_eq!(colors.get(0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(colors.get(1.0, 1.0), Vec3::new(1.0, 0.875, 0.5625));
        assert_eq!(colors.get(1.0, 0.0), Vec3::new(1.0, 0.25, 0.25));
        assert_eq!(PulseColors::default(), colors);
    }

    #[test]
    fn test_render_brightest_at_head() {
        let pulse = Pulse::new(DVec2::new(60.0, 20.0), DVec2::new(0.0, 1.0), 4, 1.0);
        let mut canvas = Canvas::with_thread_count(120, 80, 3).unwrap();
        PulseRenderer::default().render(&pulse, &mut canvas).unwrap();

        let head = canvas.buffer().rgb(60, 20).unwrap();
        assert_eq!(head[0], 255);
        let tail = canvas.buffer().rgb(60, 0).unwrap();
        assert!(tail[0] > 0 && tail[0] < head[0], "{tail:?}");
        // Ahead of the head tip.
        assert_eq!(canvas.buffer().rgb(60, 50).unwrap(), [0, 0, 0]);
        // Off to the side of the tail.
        assert_eq!(canvas.buffer().rgb(30, 5).unwrap(), [0, 0, 0]);
    }

    #[test]
    fn test_strike() {
        let mut stream = SeedStream::new(8);
        let mut rock = Rock::roll(DVec2::new(100.0, 100.0), &mut stream, &RockSpawnParams::default(), 1.0).unwrap();
        let spin = rock.rotation_speed;
        let integrity = rock.shape.integrity();

        let miss = Pulse::new(DVec2::new(-500.0, 0.0), DVec2::X, 0, 5.0);
        assert!(!miss.strike(&mut rock));
        assert_eq!(rock.shape.integrity(), integrity);

        let hit = Pulse::new(DVec2::new(100.0, 100.0), DVec2::X, 0, 5.0);
        assert!(rock.contains_point(hit.position));
        assert!(hit.strike(&mut rock));
        assert_eq!(rock.shape.integrity(), integrity - 5.0);
        // Dead center hit adds no spin.
        assert_eq!(rock.rotation_speed, spin);
    }
}
