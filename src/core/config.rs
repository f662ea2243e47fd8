//! Render configuration loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Result;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Full renderer configuration. Every field has a default, so a partial
/// JSON document is enough.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Logical canvas width in pixels.
    pub width: u32,
    /// Logical canvas height in pixels.
    pub height: u32,
    /// Shader threads. `None` = rayon's current thread count.
    pub thread_count: Option<usize>,
    /// Scrolling backdrop parameters.
    pub backdrop: BackdropParams,
    /// Parameters used when rolling new rocks.
    pub rock: RockSpawnParams,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            thread_count: None,
            backdrop: BackdropParams::default(),
            rock: RockSpawnParams::default(),
        }
    }
}

impl RenderConfig {
    /// Read a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&text)?;
        log::debug!("Loaded render config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Write this config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Thread count to use for shader dispatch.
    pub fn resolved_thread_count(&self) -> usize {
        self.thread_count.unwrap_or_else(rayon::current_num_threads)
    }
}

// ---------------------------------------------------------------------------
// Backdrop
// ---------------------------------------------------------------------------

/// Octave layout of the scrolling backdrop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropParams {
    /// Cell size of the coarsest octave (default: 1024).
    pub cell_size: f64,
    /// Cell size multiplier per octave (default: 0.5).
    pub size_factor: f64,
    /// Amplitude of the coarsest octave (default: 0.1875).
    pub amplitude: f32,
    /// Amplitude multiplier per octave (default: 0.625).
    pub amplitude_factor: f32,
    /// Number of octaves (default: 10).
    pub layers: usize,
    /// Downward scroll speed in pixels per second (default: 32).
    pub scroll_speed: f64,
}

impl Default for BackdropParams {
    fn default() -> Self {
        Self {
            cell_size: 1024.0,
            size_factor: 0.5,
            amplitude: 0.1875,
            amplitude_factor: 0.625,
            layers: 10,
            scroll_speed: 32.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Rocks
// ---------------------------------------------------------------------------

/// Ranges used by [`crate::rock::RockParams::roll`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RockSpawnParams {
    /// Smallest nominal radius (default: 40).
    pub min_size: f64,
    /// Largest nominal radius (default: 160).
    pub max_size: f64,
    /// Cell size of the coarsest height octave (default: 64).
    pub noise_cell_size: f64,
    pub noise_size_factor: f64,
    pub noise_amplitude: f32,
    pub noise_amplitude_factor: f32,
    /// Height octaves (default: 5).
    pub noise_layers: usize,
    /// Fracture cell size as a fraction of the rock size (default: 0.25).
    pub fracture_cell_fraction: f64,
    /// Voronoi jitter of the fracture pattern (default: 0.75).
    pub fracture_jitter: f64,
    /// Seconds from integrity reaching zero to destruction (default: 0.5).
    pub fracture_duration: f64,
    /// Starting integrity per unit of squared size (default: 1/64).
    pub integrity_per_area: f64,
}

impl Default for RockSpawnParams {
    fn default() -> Self {
        Self {
            min_size: 40.0,
            max_size: 160.0,
            noise_cell_size: 64.0,
            noise_size_factor: 0.5,
            noise_amplitude: 0.5,
            noise_amplitude_factor: 0.5,
            noise_layers: 5,
            fracture_cell_fraction: 0.25,
            fracture_jitter: 0.75,
            fracture_duration: 0.5,
            integrity_per_area: 0.015625,
        }
    }
}
