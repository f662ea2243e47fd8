//! Scrolling noise backdrop.
//!
//! The whole canvas is redrawn every frame, one row per call. Each row is
//! filled with a single bulk X query against the noise field, then mapped
//! onto an orange/red palette with ordered dithering.

use super::registry::Renderer;
use crate::core::config::BackdropParams;
use crate::core::{Error, Result};
use crate::field::{NoiseGrid, ValueField};
use crate::math::PixelRect;
use crate::raster::dither::bayer_f32;
use crate::raster::{Canvas, Row, RowShader};

/// Distance in pixels between horizontally adjacent samples.
const PIXEL_STEP: f64 = 1.0;

/// Noise field that drifts downward over time.
#[derive(Clone, Debug)]
pub struct Backdrop {
    noise: NoiseGrid,
    /// Offset of the field relative to the canvas.
    pub x: f64,
    pub y: f64,
    /// Pixels per second.
    pub scroll_speed: f64,
}

impl Backdrop {
    /// Fails if any noise layer is finer than one pixel, since rows are
    /// sampled with a bulk query.
    pub fn new(noise: NoiseGrid, scroll_speed: f64) -> Result<Self> {
        if let Some(cell_size) = noise.min_cell_size().filter(|&size| size < PIXEL_STEP) {
            return Err(Error::StepTooLarge { step: PIXEL_STEP, cell_size });
        }
        Ok(Self {
            noise,
            x: 0.0,
            y: 0.0,
            scroll_speed,
        })
    }

    pub fn from_params(seed: i64, params: &BackdropParams) -> Result<Self> {
        let noise = NoiseGrid::octaves(
            seed,
            params.cell_size,
            params.size_factor,
            params.amplitude,
            params.amplitude_factor,
            params.layers,
        )?;
        log::debug!("Backdrop seed {seed}: {} layers, finest cell {:?}", noise.layer_count(), noise.min_cell_size());
        Self::new(noise, params.scroll_speed)
    }

    pub fn noise(&self) -> &NoiseGrid {
        &self.noise
    }

    pub fn advance(&mut self, delta_seconds: f64) {
        self.y += delta_seconds * self.scroll_speed;
    }

    /// Brightness at a canvas position, centered on 0.5.
    pub fn value(&self, x: f64, y: f64) -> f32 {
        self.noise.value(x - self.x, y - self.y) + 0.5
    }

    /// [`Backdrop::value`] for `out.len()` consecutive pixels starting at
    /// `(x, y)`.
    pub fn values_x(&self, x: f64, y: f64, out: &mut [f32]) -> Result<()> {
        out.fill(0.5);
        self.noise.values_x(x - self.x, y - self.y, PIXEL_STEP, out)
    }
}

/// Map a backdrop value in `[0, 1]` to RGB, adding `dithering` before
/// truncation.
#[inline]
pub fn palette(value: f32, dithering: f32) -> (i32, i32, i32) {
    let value = value.clamp(0.0, 1.0);
    // Shared by red and blue.
    let common = value * (2.0 - value) * 255.0;
    (
        (value * common + dithering) as i32,
        (value * value * 255.0 + dithering) as i32,
        (common + dithering) as i32,
    )
}

/// Draws a [`Backdrop`] over the whole canvas.
#[derive(Clone, Copy, Debug, Default)]
pub struct BackdropRenderer;

impl Renderer<Backdrop> for BackdropRenderer {
    fn render(&self, backdrop: &Backdrop, canvas: &mut Canvas) -> Result<()> {
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);
        canvas.run_over_rows(PixelRect::new(0, 0, width, height), &BackdropRows { backdrop })
    }
}

struct BackdropRows<'a> {
    backdrop: &'a Backdrop,
}

impl RowShader for BackdropRows<'_> {
    type Scratch = Vec<f32>;

    fn new_scratch(&self) -> Vec<f32> {
        Vec::new()
    }

    fn shade_row(&self, row: &mut Row<'_>, values: &mut Vec<f32>) {
        let (y, min_x) = (row.y, row.min_x);
        values.resize(row.len(), 0.0);
        if let Err(err) = self.backdrop.values_x(min_x as f64, y as f64, values) {
            // Unreachable for a backdrop built through `Backdrop::new`.
            panic!("backdrop row {y}: {err}");
        }
        for ((x, mut pixel), &value) in (min_x..).zip(row.pixels()).zip(values.iter()) {
            let (red, green, blue) = palette(value, bayer_f32(x, y));
            pixel.set_rgb(red, green, blue);
        }
    }
}
