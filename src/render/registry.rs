//! Entity type to renderer lookup.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use super::backdrop::{Backdrop, BackdropRenderer};
use super::pulse::{Pulse, PulseRenderer};
use super::rock::RockRenderer;
use super::sprite::{Sprite, SpriteRenderer};
use crate::core::{Error, Result};
use crate::raster::Canvas;
use crate::rock::Rock;

/// Draws entities of type `E` onto a canvas.
pub trait Renderer<E>: Send + Sync {
    fn render(&self, entity: &E, canvas: &mut Canvas) -> Result<()>;
}

/// One renderer per entity type.
#[derive(Default)]
pub struct RendererRegistry {
    // Values are `Box<dyn Renderer<E>>` for the `E` of the key.
    renderers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in renderers for [`Backdrop`], [`Rock`],
    /// [`Pulse`] and [`Sprite`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register::<Backdrop, _>(BackdropRenderer);
        registry.register::<Rock, _>(RockRenderer);
        registry.register::<Pulse, _>(PulseRenderer::default());
        registry.register::<Sprite, _>(SpriteRenderer);
        registry
    }

    /// Associate `renderer` with `E`, replacing any previous one.
    pub fn register<E, R>(&mut self, renderer: R)
    where
        E: 'static,
        R: Renderer<E> + 'static,
    {
        let boxed: Box<dyn Renderer<E>> = Box::new(renderer);
        if self.renderers.insert(TypeId::of::<E>(), Box::new(boxed)).is_some() {
            log::debug!("Replaced renderer for {}", type_name::<E>());
        }
    }

    pub fn contains<E: 'static>(&self) -> bool {
        self.renderers.contains_key(&TypeId::of::<E>())
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// The renderer registered for `E`.
    pub fn renderer_for<E: 'static>(&self) -> Result<&dyn Renderer<E>> {
        self.renderers
            .get(&TypeId::of::<E>())
            .and_then(|entry| entry.downcast_ref::<Box<dyn Renderer<E>>>())
            .map(|renderer| renderer.as_ref())
            .ok_or(Error::NoRenderer(type_name::<E>()))
    }

    pub fn render<E: 'static>(&self, entity: &E, canvas: &mut Canvas) -> Result<()> {
        self.renderer_for::<E>()?.render(entity, canvas)
    }

    /// Render every entity in order, resolving the renderer once.
    pub fn render_all<E: 'static>(&self, entities: &[E], canvas: &mut Canvas) -> Result<()> {
        let renderer = self.renderer_for::<E>()?;
        for entity in entities {
            renderer.render(entity, canvas)?;
        }
        Ok(())
    }
}
