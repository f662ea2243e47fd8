//! Reads an image through a fixed translation.

use image::{Rgba, RgbaImage};

/// Maps destination coordinates onto an image:
/// `sample(x, y) == image[(x + dx, y + dy)]`, where `(dx, dy)` is the
/// source origin minus the destination origin.
#[derive(Clone, Copy, Debug)]
pub struct TranslatedSampler<'a> {
    image: &'a RgbaImage,
    // Widened so translations between extreme coordinates cannot overflow.
    dx: i64,
    dy: i64,
}

impl<'a> TranslatedSampler<'a> {
    /// Destination `(dst_x, dst_y)` reads source `(src_x, src_y)`.
    pub fn new(image: &'a RgbaImage, src_x: i32, src_y: i32, dst_x: i32, dst_y: i32) -> Self {
        Self {
            image,
            dx: src_x as i64 - dst_x as i64,
            dy: src_y as i64 - dst_y as i64,
        }
    }

    /// Image origin placed at `(dst_x, dst_y)`.
    pub fn at(image: &'a RgbaImage, dst_x: i32, dst_y: i32) -> Self {
        Self::new(image, 0, 0, dst_x, dst_y)
    }

    pub fn translation(&self) -> (i64, i64) {
        (self.dx, self.dy)
    }

    /// Pixel at destination `(x, y)`, or `None` when that falls outside the image.
    #[inline]
    pub fn sample(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        let sx = u32::try_from(x as i64 + self.dx).ok()?;
        let sy = u32::try_from(y as i64 + self.dy).ok()?;
        self.image.get_pixel_checked(sx, sy).copied()
    }
}
