//! Rock shading: grayscale lit from the upper left.

use std::f32::consts::FRAC_1_SQRT_2;

use super::registry::Renderer;
use crate::core::{Result, Vec3};
use crate::field::SeedPointQuery;
use crate::math::scalar::mix;
use crate::raster::pixel::f2i;
use crate::raster::{Canvas, Shader, ShaderContext};
use crate::rock::Rock;

/// Brightness in `[0, 1]` (before tint) of a surface with the given unit
/// normal. `tint` scales between darkened and brightened.
#[inline]
pub fn surface_brightness(normal: Vec3, tint: f32) -> f32 {
    let brightness = (normal.x + normal.y) * -FRAC_1_SQRT_2;
    let brightness = brightness * 0.5 + 0.5;
    brightness * mix(0.5, 2.0 - brightness, tint)
}

/// Draws a [`Rock`] over the circle of radius `size` around its position.
#[derive(Clone, Copy, Debug, Default)]
pub struct RockRenderer;

impl Renderer<Rock> for RockRenderer {
    fn render(&self, rock: &Rock, canvas: &mut Canvas) -> Result<()> {
        if !rock.is_alive() {
            return Ok(());
        }
        canvas.run_over_circle(rock.position.x, rock.position.y, rock.shape.size(), &RockShader { rock })
    }
}

struct RockShader<'a> {
    rock: &'a Rock,
}

impl Shader for RockShader<'_> {
    type Scratch = SeedPointQuery;

    fn new_scratch(&self) -> SeedPointQuery {
        self.rock.shape.new_query()
    }

    fn shade(&self, context: &mut ShaderContext<'_, SeedPointQuery>) {
        let x = context.x as f64 - self.rock.position.x;
        let y = context.y as f64 - self.rock.position.y;
        let (mut pixel, query) = context.pixel_and_scratch();
        if let Some(normal) = self.rock.shape.surface_normal(x, y, query) {
            pixel.set_grayscale(f2i(surface_brightness(normal, self.rock.brightness)));
        }
    }
}
