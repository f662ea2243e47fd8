//! Entity renderers built on [`crate::raster::Canvas`] dispatches.
//!
//! Entities never draw themselves. Each entity type is paired with a
//! [`Renderer`] in a [`RendererRegistry`], and the caller renders through
//! the registry.

pub mod registry;
pub mod backdrop;
pub mod rock;
pub mod pulse;
pub mod sprite;

pub use registry::{Renderer, RendererRegistry};
pub use backdrop::{Backdrop, BackdropRenderer};
pub use rock::RockRenderer;
pub use pulse::{Pulse, PulseColors, PulseRenderer};
pub use sprite::{Sprite, SpriteRenderer};
