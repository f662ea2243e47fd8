//! Entities drawn from a fixed image.

use image::RgbaImage;

use super::registry::Renderer;
use crate::core::{DVec2, Result};
use crate::raster::Canvas;

/// An image centered on a position.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub image: RgbaImage,
    pub position: DVec2,
}

impl Sprite {
    pub fn new(image: RgbaImage, position: DVec2) -> Self {
        Self { image, position }
    }

    /// Canvas position of the image's top-left corner. Truncates toward
    /// zero.
    pub fn top_left(&self) -> (i32, i32) {
        (
            (self.position.x - self.image.width() as f64 * 0.5) as i32,
            (self.position.y - self.image.height() as f64 * 0.5) as i32,
        )
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SpriteRenderer;

impl Renderer<Sprite> for SpriteRenderer {
    fn render(&self, sprite: &Sprite, canvas: &mut Canvas) -> Result<()> {
        let (x, y) = sprite.top_left();
        canvas.draw_image(x, y, &sprite.image)
    }
}
