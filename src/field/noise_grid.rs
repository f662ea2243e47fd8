//! Fractal sum of value-noise octaves.

use super::{Axis, ValueAndDerivative, ValueField, ValueGrid};
use crate::core::{Error, Result};
use crate::math::hash::permute;

/// Sum of several [`ValueGrid`] layers. Every query is forwarded to each
/// layer in order and the results are added together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoiseGrid {
    layers: Vec<ValueGrid>,
}

impl NoiseGrid {
    pub fn new(layers: Vec<ValueGrid>) -> Self {
        Self { layers }
    }

    /// Build `layer_count` octaves. Layer `i` is seeded with
    /// `permute(seed, i)`; cell size and amplitude are multiplied by their
    /// factors after each layer.
    pub fn octaves(
        seed: i64,
        start_size: f64,
        size_factor: f64,
        start_amplitude: f32,
        amplitude_factor: f32,
        layer_count: usize,
    ) -> Result<Self> {
        let mut layers = Vec::with_capacity(layer_count);
        let mut size = start_size;
        let mut amplitude = start_amplitude;
        for i in 0..layer_count {
            let salt = i32::try_from(i)
                .map_err(|_| Error::InvalidParameter(format!("too many noise layers: {layer_count}")))?;
            layers.push(ValueGrid::new(permute(seed, salt), size, amplitude)?);
            size *= size_factor;
            amplitude *= amplitude_factor;
        }
        Ok(Self { layers })
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> Option<&ValueGrid> {
        self.layers.get(index)
    }

    pub fn layers(&self) -> &[ValueGrid] {
        &self.layers
    }

    /// Smallest layer cell size, i.e. the largest step a bulk query accepts.
    pub fn min_cell_size(&self) -> Option<f64> {
        self.layers.iter().map(ValueGrid::cell_size).reduce(f64::min)
    }
}

impl ValueField for NoiseGrid {
    fn value(&self, x: f64, y: f64) -> f32 {
        self.layers.iter().map(|layer| layer.value(x, y)).sum()
    }

    fn value_and_derivative(&self, x: f64, y: f64, out: &mut ValueAndDerivative) {
        for layer in &self.layers {
            layer.value_and_derivative(x, y, out);
        }
    }

    fn values_along(&self, x: f64, y: f64, axis: Axis, step: f64, out: &mut [f32]) -> Result<()> {
        // Check every layer up front so a failure never leaves `out` half-accumulated.
        if let Some(cell_size) = self.min_cell_size() {
            if step > cell_size {
                return Err(Error::StepTooLarge { step, cell_size });
            }
        }
        for layer in &self.layers {
            layer.values_along(x, y, axis, step, out)?;
        }
        Ok(())
    }
}
