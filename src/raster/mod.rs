//! CPU rasterization: the pixel buffer, parallel shader dispatch and the
//! helpers shaders draw with.

pub mod pixel;
pub mod pixel_buffer;
pub mod slicing;
pub mod shader;
pub mod dispatch;
pub mod canvas;
pub mod sampler;
pub mod dither;

pub use canvas::Canvas;
pub use dispatch::{DispatchError, SliceFailure};
pub use pixel::PixelMut;
pub use pixel_buffer::PixelBuffer;
pub use sampler::TranslatedSampler;
pub use shader::{Row, RowShader, Shader, ShaderContext, shader_fn, shader_with};
