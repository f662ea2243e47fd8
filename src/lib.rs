//! Shatter - procedural asteroid fields on a parallel CPU rasterizer
//!
//! Rocks are derived heightfields: a sum of value-noise octaves with a
//! paraboloid bias, cut into fragments by a Voronoi crack pattern once they
//! break. Everything is drawn by running per-pixel shaders over a
//! power-of-two framebuffer, split into bands that run on the rayon pool.

pub mod core;
pub mod math;
pub mod field;
pub mod rock;
pub mod raster;
pub mod render;
