//! Per-pixel and per-row callbacks run by [`crate::raster::Canvas`].
//!
//! A dispatch splits its area into one band of rows per slice and runs each
//! band on its own worker. Every band gets one [`ShaderContext`], created
//! before the first pixel and reused for the rest of the band, holding
//! whatever scratch state the shader asked for. A shader may only write the
//! pixel the context currently points at; the context only exposes that one.

use super::pixel::{BYTES_PER_PIXEL, PixelMut};
use super::pixel_buffer::base_offset;

/// Per-pixel callback.
pub trait Shader: Sync {
    /// Scratch state owned by one band, e.g. caches or accumulators.
    type Scratch;

    fn new_scratch(&self) -> Self::Scratch;

    fn shade(&self, context: &mut ShaderContext<'_, Self::Scratch>);
}

/// Where a [`Shader`] is drawing and the band-local state it may use.
pub struct ShaderContext<'a, S> {
    pub x: i32,
    pub y: i32,
    /// Byte offset of `(x, y)` in the whole backing array.
    pub base_offset: usize,
    slice: usize,
    width_shift: u32,
    band_start: usize,
    band: &'a mut [u8],
    scratch: S,
}

impl<'a, S> ShaderContext<'a, S> {
    pub(crate) fn new(slice: usize, width_shift: u32, band_start: usize, band: &'a mut [u8], scratch: S) -> Self {
        Self {
            x: 0,
            y: 0,
            base_offset: band_start,
            slice,
            width_shift,
            band_start,
            band,
            scratch,
        }
    }

    #[inline]
    pub(crate) fn start_row(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        self.base_offset = base_offset(self.width_shift, x, y);
    }

    #[inline]
    pub(crate) fn move_right(&mut self) {
        self.x += 1;
        self.base_offset += BYTES_PER_PIXEL;
    }

    /// Index of the band this context belongs to.
    pub fn slice(&self) -> usize {
        self.slice
    }

    /// The pixel at `(x, y)`.
    #[inline]
    pub fn pixel(&mut self) -> PixelMut<'_> {
        PixelMut::new(&mut self.band[self.base_offset - self.band_start..])
    }

    #[inline]
    pub fn scratch(&mut self) -> &mut S {
        &mut self.scratch
    }

    /// The current pixel and the scratch state together.
    #[inline]
    pub fn pixel_and_scratch(&mut self) -> (PixelMut<'_>, &mut S) {
        let offset = self.base_offset - self.band_start;
        (PixelMut::new(&mut self.band[offset..]), &mut self.scratch)
    }
}

/// [`Shader`] built from a scratch constructor and a per-pixel closure.
pub struct FnShader<I, F> {
    init: I,
    shade: F,
}

impl<S, I, F> Shader for FnShader<I, F>
where
    I: Fn() -> S + Sync,
    F: Fn(&mut ShaderContext<'_, S>) + Sync,
{
    type Scratch = S;

    fn new_scratch(&self) -> S {
        (self.init)()
    }

    fn shade(&self, context: &mut ShaderContext<'_, S>) {
        (self.shade)(context)
    }
}

/// Shader without scratch state.
pub fn shader_fn<F>(shade: F) -> FnShader<fn(), F>
where
    F: Fn(&mut ShaderContext<'_, ()>) + Sync,
{
    FnShader { init: || (), shade }
}

/// Shader whose bands each start with a fresh `init()`.
pub fn shader_with<S, I, F>(init: I, shade: F) -> FnShader<I, F>
where
    I: Fn() -> S + Sync,
    F: Fn(&mut ShaderContext<'_, S>) + Sync,
{
    FnShader { init, shade }
}

/// One clipped row handed to a [`RowShader`].
pub struct Row<'a> {
    pub y: i32,
    /// First column covered by `pixels`.
    pub min_x: i32,
    bytes: &'a mut [u8],
}

impl<'a> Row<'a> {
    pub(crate) fn new(y: i32, min_x: i32, bytes: &'a mut [u8]) -> Self {
        Self { y, min_x, bytes }
    }

    /// Number of pixels in the row.
    pub fn len(&self) -> usize {
        self.bytes.len() / BYTES_PER_PIXEL
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pixels left to right, starting at column `min_x`.
    pub fn pixels(&mut self) -> impl Iterator<Item = PixelMut<'_>> {
        self.bytes.chunks_exact_mut(BYTES_PER_PIXEL).map(PixelMut::new)
    }
}

/// Whole-row callback, for shaders that compute a row at once (bulk noise
/// queries) rather than pixel by pixel.
pub trait RowShader: Sync {
    type Scratch;

    fn new_scratch(&self) -> Self::Scratch;

    fn shade_row(&self, row: &mut Row<'_>, scratch: &mut Self::Scratch);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_walks_row() {
        let mut band = vec![0u8; 8 * 4 * 2];
        // Band covering rows 1..3 of a buffer with 8-pixel rows.
        let band_start = 8 * 4;
        let mut context = ShaderContext::new(0, 3, band_start, &mut band[..], 0u32);
        context.start_row(2, 1);
        assert_eq!(context.base_offset, (8 + 2) * 4);
        context.pixel().set_rgb(1, 2, 3);
        context.move_right();
        assert_eq!((context.x, context.y), (3, 1));
        let (mut pixel, count) = context.pixel_and_scratch();
        pixel.set_grayscale(9);
        *count += 1;
        assert_eq!(*context.scratch(), 1);
        assert_eq!(&band[8..12], &[3, 2, 1, 0]);
        assert_eq!(&band[12..16], &[9, 9, 9, 0]);
    }

    #[test]
    fn test_row_pixels() {
        let mut bytes = vec![0u8; 12];
        let mut row = Row::new(4, 2, &mut bytes);
        assert_eq!(row.len(), 3);
        for (i, mut pixel) in row.pixels().enumerate() {
            pixel.set_grayscale(i as i32 * 10);
        }
        assert_eq!(bytes, [0, 0, 0, 0, 10, 10, 10, 0, 20, 20, 20, 0]);
    }
}
