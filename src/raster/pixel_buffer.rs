//! CPU-owned framebuffer.
//!
//! The backing array is sized to the next power of two in each dimension so
//! a pixel's byte offset is `((y << width_shift) | x) << 2`. It is only
//! reallocated when the rounded size changes, which keeps window resizes
//! cheap.

use image::{ImageEncoder, RgbaImage};

use super::pixel::{ALPHA_OFFSET, BLUE_OFFSET, BYTES_PER_PIXEL, BYTES_PER_PIXEL_SHIFT, GREEN_OFFSET, PixelMut, RED_OFFSET};
use crate::core::{Error, Result};
use crate::math::scalar::next_power_of_two;

/// Largest total shift (`width_shift + height_shift + 2`) a backing array may have.
const MAX_TOTAL_SHIFT: u32 = 31;

/// BGRA pixel storage with a power-of-two row stride.
#[derive(Clone, Debug, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    rounded_width: u64,
    rounded_height: u64,
    width_shift: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut buffer = Self::default();
        buffer.resize(width, height)?;
        Ok(buffer)
    }

    /// Change the logical size. A zero dimension records the size but keeps
    /// the current backing array. Pixel contents survive when the rounded
    /// size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            self.width = width;
            self.height = height;
            return Ok(());
        }

        let rounded_width = next_power_of_two(width);
        let rounded_height = next_power_of_two(height);
        if rounded_width != self.rounded_width || rounded_height != self.rounded_height {
            let width_shift = rounded_width.trailing_zeros();
            let height_shift = rounded_height.trailing_zeros();
            let total_shift = width_shift + height_shift + BYTES_PER_PIXEL_SHIFT;
            if total_shift >= MAX_TOTAL_SHIFT {
                return Err(Error::AllocationTooLarge {
                    width,
                    height,
                    rounded_width,
                    rounded_height,
                });
            }

            let mut pixels = vec![0u8; 1usize << total_shift];
            for pixel in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
                pixel[ALPHA_OFFSET] = 255;
            }
            log::debug!(
                "Reallocated pixel buffer: {}x{} backing for {}x{} ({} KiB)",
                rounded_width,
                rounded_height,
                width,
                height,
                pixels.len() / 1024
            );

            self.pixels = pixels;
            self.rounded_width = rounded_width;
            self.rounded_height = rounded_height;
            self.width_shift = width_shift;
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rounded_width(&self) -> u64 {
        self.rounded_width
    }

    pub fn rounded_height(&self) -> u64 {
        self.rounded_height
    }

    /// `1 << width_shift == rounded_width`
    pub fn width_shift(&self) -> u32 {
        self.width_shift
    }

    /// Bytes per backing row.
    pub fn stride(&self) -> usize {
        (self.rounded_width as usize) << BYTES_PER_PIXEL_SHIFT
    }

    /// Whole backing array, including the padding outside the logical size.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Byte offset of pixel `(x, y)`. Unchecked in release builds; public
    /// callers go through [`PixelBuffer::checked_offset`].
    #[inline]
    pub(crate) fn base_offset(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.in_bounds(x, y));
        base_offset(self.width_shift, x, y)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Byte offset of `(x, y)`, or an error outside the logical size.
    pub fn checked_offset(&self, x: i32, y: i32) -> Result<usize> {
        if !self.in_bounds(x, y) {
            return Err(Error::PixelOutOfBounds {
                x: x as i64,
                y: y as i64,
                width: self.width,
                height: self.height,
            });
        }
        Ok(base_offset(self.width_shift, x, y))
    }

    pub fn pixel_mut(&mut self, x: i32, y: i32) -> Result<PixelMut<'_>> {
        let offset = self.checked_offset(x, y)?;
        Ok(PixelMut::new(&mut self.pixels[offset..]))
    }

    /// `[red, green, blue]` at `(x, y)`.
    pub fn rgb(&self, x: i32, y: i32) -> Result<[u8; 3]> {
        let offset = self.checked_offset(x, y)?;
        let pixel = &self.pixels[offset..offset + BYTES_PER_PIXEL];
        Ok([pixel[RED_OFFSET], pixel[GREEN_OFFSET], pixel[BLUE_OFFSET]])
    }

    /// Packed `0xAARRGGBB` with alpha forced opaque.
    pub fn argb(&self, x: i32, y: i32) -> Result<u32> {
        let [r, g, b] = self.rgb(x, y)?;
        Ok(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Copy the logical rectangle into `dst`, whose rows are `dst_stride`
    /// bytes apart. Pixels keep their BGRA layout.
    pub fn flush_into(&self, dst: &mut [u8], dst_stride: usize) -> Result<()> {
        let row_bytes = self.width as usize * BYTES_PER_PIXEL;
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        let needed = dst_stride * (self.height as usize - 1) + row_bytes;
        if dst_stride < row_bytes || dst.len() < needed {
            return Err(Error::InvalidParameter(format!(
                "destination of {} bytes with stride {} cannot hold {}x{} pixels",
                dst.len(),
                dst_stride,
                self.width,
                self.height
            )));
        }
        let stride = self.stride();
        for y in 0..self.height as usize {
            let src = &self.pixels[y * stride..y * stride + row_bytes];
            dst[y * dst_stride..y * dst_stride + row_bytes].copy_from_slice(src);
        }
        Ok(())
    }

    /// Logical rectangle as an opaque RGBA image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let stride = self.stride();
        let mut image = RgbaImage::new(self.width, self.height);
        for (x, y, out) in image.enumerate_pixels_mut() {
            let offset = y as usize * stride + ((x as usize) << BYTES_PER_PIXEL_SHIFT);
            let pixel = &self.pixels[offset..offset + BYTES_PER_PIXEL];
            out.0 = [pixel[RED_OFFSET], pixel[GREEN_OFFSET], pixel[BLUE_OFFSET], 255];
        }
        image
    }

    /// Logical rectangle encoded as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let image = self.to_rgba_image();
        let mut png_data = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_data).write_image(
            image.as_raw(),
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(png_data)
    }
}

#[inline]
pub(crate) fn base_offset(width_shift: u32, x: i32, y: i32) -> usize {
    (((y as usize) << width_shift) | x as usize) << BYTES_PER_PIXEL_SHIFT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_backing() {
        let buffer = PixelBuffer::new(600, 300).unwrap();
        assert_eq!(buffer.width(), 600);
        assert_eq!(buffer.rounded_width(), 1024);
        assert_eq!(buffer.rounded_height(), 512);
        assert_eq!(buffer.stride(), 4096);
        assert_eq!(buffer.as_bytes().len(), 1024 * 512 * 4);
        assert_eq!(buffer.base_offset(3, 2), (2 * 1024 + 3) * 4);
        assert_eq!(buffer.base_offset(0, 2), 2 * 4096);
    }

    #[test]
    fn test_alpha_opaque_after_allocation() {
        let buffer = PixelBuffer::new(5, 3).unwrap();
        assert!(buffer.as_bytes().chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_resize_keeps_backing_when_rounded_size_unchanged() {
        let mut buffer = PixelBuffer::new(100, 100).unwrap();
        buffer.pixel_mut(10, 10).unwrap().set_rgb(1, 2, 3);
        buffer.resize(120, 90).unwrap();
        assert_eq!(buffer.width(), 120);
        assert_eq!(buffer.rgb(10, 10).unwrap(), [1, 2, 3]);

        buffer.resize(200, 90).unwrap();
        assert_eq!(buffer.rounded_width(), 256);
        assert_eq!(buffer.rgb(10, 10).unwrap(), [0, 0, 0]);
    }

    #[test]
    fn test_zero_size_keeps_backing() {
        let mut buffer = PixelBuffer::new(64, 64).unwrap();
        buffer.resize(0, 64).unwrap();
        assert_eq!(buffer.width(), 0);
        assert_eq!(buffer.rounded_width(), 64);
        assert_eq!(buffer.as_bytes().len(), 64 * 64 * 4);
        assert!(buffer.rgb(0, 0).is_err());

        let empty = PixelBuffer::new(0, 0).unwrap();
        assert!(empty.as_bytes().is_empty());
    }

    #[test]
    fn test_allocation_too_large() {
        let err = PixelBuffer::new(1 << 15, 1 << 14).unwrap_err();
        assert!(matches!(
            err,
            Error::AllocationTooLarge { rounded_width: 32768, rounded_height: 16384, .. }
        ));
        let err = PixelBuffer::new(u32::MAX, 1).unwrap_err();
        assert!(matches!(err, Error::AllocationTooLarge { rounded_width: 4294967296, .. }));

        // A failed resize leaves the buffer as it was.
        let mut buffer = PixelBuffer::new(8, 8).unwrap();
        assert!(buffer.resize(1 << 16, 1 << 16).is_err());
        assert_eq!((buffer.width(), buffer.height()), (8, 8));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buffer = PixelBuffer::new(10, 10).unwrap();
        assert!(matches!(buffer.pixel_mut(10, 0), Err(Error::PixelOutOfBounds { x: 10, .. })));
        assert!(buffer.pixel_mut(-1, 0).is_err());
        // Padding columns exist in the backing array but are not addressable.
        assert!(buffer.rgb(12, 0).is_err());
        // Past the padding, x would alias the next backing row.
        let rounded = buffer.rounded_width() as i32;
        assert!(matches!(buffer.checked_offset(rounded, 0), Err(Error::PixelOutOfBounds { .. })));
        assert!(buffer.checked_offset(0, 10).is_err());
        assert_eq!(buffer.checked_offset(9, 9).unwrap(), buffer.base_offset(9, 9));
    }

    #[test]
    fn test_argb() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        buffer.pixel_mut(1, 2).unwrap().set_rgb(0x12, 0x34, 0x56);
        assert_eq!(buffer.argb(1, 2).unwrap(), 0xFF123456);
    }

    #[test]
    fn test_flush_into() {
        let mut buffer = PixelBuffer::new(3, 2).unwrap();
        buffer.pixel_mut(2, 1).unwrap().set_rgb(9, 8, 7);
        let mut dst = vec![0u8; 16 * 2];
        buffer.flush_into(&mut dst, 16).unwrap();
        assert_eq!(&dst[16 + 8..16 + 12], &[7, 8, 9, 255]);
        assert_eq!(&dst[12..16], &[0, 0, 0, 0]);

        let mut small = vec![0u8; 10];
        assert!(buffer.flush_into(&mut small, 12).is_err());
    }

    #[test]
    fn test_to_rgba_image_and_png() {
        let mut buffer = PixelBuffer::new(2, 2).unwrap();
        buffer.pixel_mut(1, 0).unwrap().set_rgb(255, 128, 0);
        let image = buffer.to_rgba_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(1, 0).0, [255, 128, 0, 255]);

        let png = buffer.encode_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, image);
    }
}
