//! Parallel shader dispatch over a [`PixelBuffer`].

use image::{Rgba, RgbaImage};

use super::dispatch::{run_bands, split_bands};
use super::pixel::BYTES_PER_PIXEL;
use super::pixel_buffer::PixelBuffer;
use super::sampler::TranslatedSampler;
use super::shader::{Row, RowShader, Shader, ShaderContext, shader_fn};
use super::slicing::{CircleSlices, MAX_THREADS, rect_row_bands};
use crate::core::{Error, RenderConfig, Result};
use crate::math::PixelRect;
use crate::math::scalar::{ceil_i32, floor_i32};

/// Framebuffer plus the machinery to run shaders over parts of it.
///
/// Every `run_*` call blocks until all bands are done. A panicking shader
/// fails its band only; the others still run and the failures come back
/// together as [`Error::Dispatch`].
#[derive(Debug)]
pub struct Canvas {
    buffer: PixelBuffer,
    thread_count: usize,
    circle_slices: CircleSlices,
}

impl Canvas {
    /// Canvas using rayon's current thread count.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_thread_count(width, height, rayon::current_num_threads().clamp(1, MAX_THREADS))
    }

    pub fn with_thread_count(width: u32, height: u32, thread_count: usize) -> Result<Self> {
        check_thread_count(thread_count)?;
        Ok(Self {
            buffer: PixelBuffer::new(width, height)?,
            thread_count,
            circle_slices: CircleSlices::new(thread_count),
        })
    }

    pub fn from_config(config: &RenderConfig) -> Result<Self> {
        Self::with_thread_count(config.width, config.height, config.resolved_thread_count())
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.buffer.resize(width, height)
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Number of bands each dispatch is split into, `1..=1024`.
    pub fn set_thread_count(&mut self, thread_count: usize) -> Result<()> {
        check_thread_count(thread_count)?;
        if thread_count != self.thread_count {
            log::debug!("Shader thread count {} -> {}", self.thread_count, thread_count);
            self.thread_count = thread_count;
            self.circle_slices = CircleSlices::new(thread_count);
        }
        Ok(())
    }

    fn logical_size(&self) -> (i32, i32) {
        (clamp_to_i32(self.buffer.width()), clamp_to_i32(self.buffer.height()))
    }

    /// Run `shader` on every pixel of `rect` that lies inside the canvas.
    pub fn run_over_rect<S: Shader>(&mut self, rect: PixelRect, shader: &S) -> Result<()> {
        let rect = rect.clipped(self.buffer.width(), self.buffer.height());
        if rect.is_empty() {
            return Ok(());
        }
        let ranges = rect_row_bands(rect.min_y, rect.max_y, self.thread_count);
        let width_shift = self.buffer.width_shift();
        let stride = self.buffer.stride();
        let bands = split_bands(self.buffer.as_bytes_mut(), stride, &ranges);

        run_bands(bands, |band| {
            let mut context = ShaderContext::new(band.slice, width_shift, band.start, band.bytes, shader.new_scratch());
            for y in band.min_y..band.max_y {
                context.start_row(rect.min_x, y);
                while context.x < rect.max_x {
                    shader.shade(&mut context);
                    context.move_right();
                }
            }
        })?;
        Ok(())
    }

    pub fn run_over_circle<S: Shader>(&mut self, center_x: f64, center_y: f64, radius: f64, shader: &S) -> Result<()> {
        self.run_over_ellipse(center_x, center_y, radius, radius, shader)
    }

    /// Run `shader` on every pixel center inside the axis-aligned ellipse.
    /// Bands have equal area rather than equal height. Non-positive radii
    /// draw nothing.
    pub fn run_over_ellipse<S: Shader>(
        &mut self,
        center_x: f64,
        center_y: f64,
        radius_x: f64,
        radius_y: f64,
        shader: &S,
    ) -> Result<()> {
        if !(radius_x > 0.0 && radius_y > 0.0) {
            return Ok(());
        }
        let (width, height) = self.logical_size();
        let min_y = ceil_i32(center_y - radius_y).max(0);
        let max_y = floor_i32(center_y + radius_y).saturating_add(1).min(height);
        if max_y <= min_y {
            return Ok(());
        }

        let ranges = self.circle_slices.row_bands(min_y, max_y);
        let width_shift = self.buffer.width_shift();
        let stride = self.buffer.stride();
        let bands = split_bands(self.buffer.as_bytes_mut(), stride, &ranges);

        run_bands(bands, |band| {
            let mut context = ShaderContext::new(band.slice, width_shift, band.start, band.bytes, shader.new_scratch());
            for y in band.min_y..band.max_y {
                let dy = (y as f64 - center_y) / radius_y;
                let row_radius = (1.0 - dy * dy).sqrt() * radius_x;
                if !(row_radius >= 0.0) {
                    continue;
                }
                let min_x = ceil_i32(center_x - row_radius).max(0);
                let max_x = floor_i32(center_x + row_radius).saturating_add(1).min(width);
                if max_x <= min_x {
                    continue;
                }
                context.start_row(min_x, y);
                while context.x < max_x {
                    shader.shade(&mut context);
                    context.move_right();
                }
            }
        })?;
        Ok(())
    }

    /// Run `shader` once per row of `rect` that lies inside the canvas.
    pub fn run_over_rows<R: RowShader>(&mut self, rect: PixelRect, shader: &R) -> Result<()> {
        let rect = rect.clipped(self.buffer.width(), self.buffer.height());
        if rect.is_empty() {
            return Ok(());
        }
        let ranges = rect_row_bands(rect.min_y, rect.max_y, self.thread_count);
        let stride = self.buffer.stride();
        let row_start = rect.min_x as usize * BYTES_PER_PIXEL;
        let row_len = rect.width() as usize * BYTES_PER_PIXEL;
        let bands = split_bands(self.buffer.as_bytes_mut(), stride, &ranges);

        run_bands(bands, |band| {
            let mut scratch = shader.new_scratch();
            for (index, y) in (band.min_y..band.max_y).enumerate() {
                let offset = index * stride + row_start;
                let mut row = Row::new(y, rect.min_x, &mut band.bytes[offset..offset + row_len]);
                shader.shade_row(&mut row, &mut scratch);
            }
        })?;
        Ok(())
    }

    /// Alpha-blend `image` with its top-left corner at `(x, y)`.
    pub fn draw_image(&mut self, x: i32, y: i32, image: &RgbaImage) -> Result<()> {
        let (width, height) = (clamp_to_i32(image.width()), clamp_to_i32(image.height()));
        self.draw_image_region(x, y, 0, 0, width, height, image)
    }

    /// Alpha-blend the `width × height` region of `image` starting at
    /// `(src_x, src_y)` with its top-left corner at `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_region(
        &mut self,
        x: i32,
        y: i32,
        src_x: i32,
        src_y: i32,
        width: i32,
        height: i32,
        image: &RgbaImage,
    ) -> Result<()> {
        let sampler = TranslatedSampler::new(image, src_x, src_y, x, y);
        let shader = shader_fn(|context| {
            if let Some(Rgba([r, g, b, a])) = sampler.sample(context.x, context.y) {
                context.pixel().blend_rgb(r as i32, g as i32, b as i32, a as i32);
            }
        });
        self.run_over_rect(PixelRect::from_origin_size(x, y, width, height), &shader)
    }
}

fn check_thread_count(thread_count: usize) -> Result<()> {
    if !(1..=MAX_THREADS).contains(&thread_count) {
        return Err(Error::InvalidParameter(format!(
            "thread count must be within 1..={MAX_THREADS}, got {thread_count}"
        )));
    }
    Ok(())
}

fn clamp_to_i32(value: u32) -> i32 {
    value.min(i32::MAX as u32) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::shader::shader_with;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn count_shader() -> impl Shader<Scratch = ()> {
        shader_fn(|context| context.pixel().add_rgb(1, 0, 0))
    }

    fn red_counts(canvas: &Canvas) -> Vec<Vec<u8>> {
        (0..canvas.height() as i32)
            .map(|y| (0..canvas.width() as i32).map(|x| canvas.buffer().rgb(x, y).unwrap()[0]).collect())
            .collect()
    }

    #[test]
    fn test_thread_count_bounds() {
        let mut canvas = Canvas::with_thread_count(4, 4, 2).unwrap();
        assert!(canvas.set_thread_count(0).is_err());
        assert!(canvas.set_thread_count(1025).is_err());
        canvas.set_thread_count(1024).unwrap();
        assert_eq!(canvas.thread_count(), 1024);
        assert!(Canvas::with_thread_count(4, 4, 0).is_err());
    }

    #[test]
    fn test_rect_writes_each_pixel_once() {
        for threads in [1, 3, 7, 64] {
            let mut canvas = Canvas::with_thread_count(37, 23, threads).unwrap();
            canvas.run_over_rect(PixelRect::new(-5, 2, 30, 100), &count_shader()).unwrap();
            let counts = red_counts(&canvas);
            for (y, row) in counts.iter().enumerate() {
                for (x, &count) in row.iter().enumerate() {
                    let inside = x < 30 && y >= 2;
                    assert_eq!(count, inside as u8, "threads {threads} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_rect_outside_is_noop() {
        let mut canvas = Canvas::with_thread_count(8, 8, 4).unwrap();
        canvas.run_over_rect(PixelRect::new(10, 10, 20, 20), &count_shader()).unwrap();
        canvas.run_over_rect(PixelRect::new(3, 3, 3, 6), &count_shader()).unwrap();
        assert!(red_counts(&canvas).iter().flatten().all(|&c| c == 0));
    }

    #[test]
    fn test_ellipse_writes_inside_once() {
        for threads in [1, 4, 13] {
            let mut canvas = Canvas::with_thread_count(64, 48, threads).unwrap();
            let (cx, cy, rx, ry) = (30.3, 20.7, 25.0, 14.5);
            canvas.run_over_ellipse(cx, cy, rx, ry, &count_shader()).unwrap();
            let counts = red_counts(&canvas);
            for (y, row) in counts.iter().enumerate() {
                for (x, &count) in row.iter().enumerate() {
                    let u = (x as f64 - cx) / rx;
                    let v = (y as f64 - cy) / ry;
                    let d = u * u + v * v;
                    if d < 0.999 {
                        assert_eq!(count, 1, "threads {threads} inside at ({x}, {y})");
                    } else if d > 1.001 {
                        assert_eq!(count, 0, "threads {threads} outside at ({x}, {y})");
                    } else {
                        assert!(count <= 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_circle_clipped_and_degenerate() {
        let mut canvas = Canvas::with_thread_count(16, 16, 4).unwrap();
        canvas.run_over_circle(0.0, 0.0, 5.0, &count_shader()).unwrap();
        let counts = red_counts(&canvas);
        assert_eq!(counts[0][0], 1);
        assert_eq!(counts[0][5], 1);
        assert_eq!(counts[5][5], 0);

        let mut canvas = Canvas::with_thread_count(16, 16, 4).unwrap();
        canvas.run_over_circle(8.0, 8.0, 0.0, &count_shader()).unwrap();
        canvas.run_over_circle(8.0, 8.0, -3.0, &count_shader()).unwrap();
        canvas.run_over_circle(-50.0, 8.0, 10.0, &count_shader()).unwrap();
        canvas.run_over_ellipse(8.0, 8.0, f64::NAN, 2.0, &count_shader()).unwrap();
        assert!(red_counts(&canvas).iter().flatten().all(|&c| c == 0));
    }

    #[test]
    fn test_scratch_created_once_per_band() {
        let created = AtomicUsize::new(0);
        let shader = shader_with(
            || {
                created.fetch_add(1, Ordering::Relaxed);
                0u32
            },
            |context: &mut ShaderContext<'_, u32>| {
                *context.scratch() += 1;
                let seen = *context.scratch();
                context.pixel().set_grayscale(seen.min(255) as i32);
            },
        );
        let mut canvas = Canvas::with_thread_count(50, 40, 6).unwrap();
        canvas.run_over_rect(PixelRect::new(0, 0, 50, 40), &shader).unwrap();
        assert_eq!(created.load(Ordering::Relaxed), 6);

        created.store(0, Ordering::Relaxed);
        canvas.run_over_circle(25.0, 20.0, 15.0, &shader).unwrap();
        assert!(created.load(Ordering::Relaxed) <= 6);
    }

    #[test]
    fn test_slice_failures_surface() {
        let mut canvas = Canvas::with_thread_count(10, 10, 5).unwrap();
        let shader = shader_fn(|context| {
            if context.y == 3 || context.y == 9 {
                panic!("row {}", context.y);
            }
            context.pixel().set_grayscale(200);
        });
        let err = canvas.run_over_rect(PixelRect::new(0, 0, 10, 10), &shader).unwrap_err();
        let Error::Dispatch(dispatch) = err else {
            panic!("expected a dispatch error");
        };
        assert_eq!(dispatch.primary.slice, 1);
        assert_eq!(dispatch.primary.message, "row 3");
        assert_eq!(dispatch.suppressed.len(), 1);
        assert_eq!(dispatch.suppressed[0].slice, 4);
        // Bands without failures finished.
        assert_eq!(canvas.buffer().rgb(0, 0).unwrap(), [200, 200, 200]);
        assert_eq!(canvas.buffer().rgb(9, 5).unwrap(), [200, 200, 200]);
    }

    struct GradientRows;

    impl RowShader for GradientRows {
        type Scratch = usize;

        fn new_scratch(&self) -> usize {
            0
        }

        fn shade_row(&self, row: &mut Row<'_>, rows_seen: &mut usize) {
            *rows_seen += 1;
            let (y, min_x) = (row.y, row.min_x);
            for (i, mut pixel) in row.pixels().enumerate() {
                pixel.set_rgb(min_x + i as i32, y, *rows_seen as i32);
            }
        }
    }

    #[test]
    fn test_run_over_rows() {
        let mut canvas = Canvas::with_thread_count(20, 12, 3).unwrap();
        canvas.run_over_rows(PixelRect::new(4, -2, 30, 9), &GradientRows).unwrap();
        assert_eq!(canvas.buffer().rgb(4, 0).unwrap(), [4, 0, 1]);
        assert_eq!(canvas.buffer().rgb(19, 8).unwrap()[..2], [19, 8]);
        assert_eq!(canvas.buffer().rgb(3, 5).unwrap(), [0, 0, 0]);
        assert_eq!(canvas.buffer().rgb(10, 9).unwrap(), [0, 0, 0]);
        // Three bands of three rows each: the third row of each band saw 3.
        assert_eq!(canvas.buffer().rgb(5, 2).unwrap()[2], 3);
    }

    #[test]
    fn test_draw_image_blends() {
        let mut canvas = Canvas::with_thread_count(8, 8, 2).unwrap();
        let image = RgbaImage::from_fn(3, 2, |x, _| match x {
            0 => Rgba([255, 0, 0, 255]),
            1 => Rgba([0, 255, 0, 0]),
            _ => Rgba([0, 0, 255, 128]),
        });
        canvas.draw_image(6, 1, &image).unwrap();
        assert_eq!(canvas.buffer().rgb(6, 1).unwrap(), [255, 0, 0]);
        assert_eq!(canvas.buffer().rgb(7, 1).unwrap(), [0, 0, 0]);
        assert_eq!(canvas.buffer().rgb(6, 3).unwrap(), [0, 0, 0]);

        canvas.draw_image_region(0, 0, 2, 0, 1, 1, &image).unwrap();
        assert_eq!(canvas.buffer().rgb(0, 0).unwrap(), [0, 0, 128]);
    }
}
