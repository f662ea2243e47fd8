//! Error types for the shatter core

use thiserror::Error;

use crate::raster::dispatch::DispatchError;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("step size ({step}) must be less than or equal to grid cell size ({cell_size})")]
    StepTooLarge { step: f64, cell_size: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    PixelOutOfBounds { x: i64, y: i64, width: u32, height: u32 },

    #[error(
        "cannot allocate a backing array with dimensions {rounded_width}x{rounded_height} \
         (requested: {width}x{height})"
    )]
    AllocationTooLarge {
        width: u32,
        height: u32,
        rounded_width: u64,
        rounded_height: u64,
    },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("no renderer registered for {0}")]
    NoRenderer(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
