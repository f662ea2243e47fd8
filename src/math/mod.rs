//! Mathematical utilities: deterministic hashing, curves and scalar helpers

pub mod hash;
pub mod curve;
pub mod scalar;
pub mod rect;

pub use curve::Curve;
pub use hash::SeedStream;
pub use rect::PixelRect;
