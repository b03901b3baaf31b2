//! Lamps: props with optical and render metadata

use super::{Prop, Resource};
use crate::core::config::LampConfig;
use crate::engine::{LampData, ObjectKey, ObjectKind, SceneEngine};
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::Vec4;

/// A prop that can take snapshots of its surroundings
///
/// All [`Prop`] accessors are reachable through [`Lamp::as_prop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lamp {
    prop: Prop,
}

impl Lamp {
    /// Create a lamp with default optics
    pub fn new<E: SceneEngine + ?Sized>(engine: &mut E) -> Self {
        Self {
            prop: Prop::from_key(engine.create_object(ObjectKind::Lamp)),
        }
    }

    /// Create a lamp and apply `config`, which is validated first
    pub fn with_config<E: SceneEngine + ?Sized>(engine: &mut E, config: &LampConfig) -> SceneResult<Self> {
        config.validate()?;
        let lamp = Self::new(engine);
        lamp.prop.apply_config(engine, &config.prop)?;

        let data = lamp.data_mut(engine)?;
        if let Some(fov) = config.field_of_view {
            data.field_of_view = fov;
        }
        if let Some(resolution) = config.resolution {
            data.resolution = resolution;
        }
        if let Some(source) = &config.source {
            data.source = Some(source.clone());
        }
        if let Some(pass) = &config.render_pass {
            data.render_pass.clone_from(pass);
        }
        if let Some(render_engine) = &config.render_engine {
            data.render_engine.clone_from(render_engine);
        }
        Ok(lamp)
    }

    /// Narrow a prop to a lamp, failing for objects without lamp data
    pub fn from_prop<E: SceneEngine + ?Sized>(engine: &E, prop: Prop) -> SceneResult<Self> {
        match prop.kind(engine)? {
            ObjectKind::Lamp => Ok(Self { prop }),
            ObjectKind::Empty => Err(SceneError::KindMismatch {
                expected: "lamp",
                found: "empty",
            }),
        }
    }

    /// The lamp viewed as a plain prop
    pub fn as_prop(&self) -> Prop {
        self.prop
    }

    fn data<'e, E: SceneEngine + ?Sized>(&self, engine: &'e E) -> SceneResult<&'e LampData> {
        engine
            .object(self.prop.key())?
            .lamp
            .as_ref()
            .ok_or_else(|| SceneError::EngineState("lamp object has no lamp data".to_string()))
    }

    fn data_mut<'e, E: SceneEngine + ?Sized>(&self, engine: &'e mut E) -> SceneResult<&'e mut LampData> {
        engine
            .object_mut(self.prop.key())?
            .lamp
            .as_mut()
            .ok_or_else(|| SceneError::EngineState("lamp object has no lamp data".to_string()))
    }

    /// Emission color (RGBA)
    pub fn color<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<Vec4> {
        Ok(self.data(engine)?.color)
    }

    /// Set the emission color
    pub fn set_color<E: SceneEngine + ?Sized>(&self, engine: &mut E, color: Vec4) -> SceneResult<()> {
        self.data_mut(engine)?.color = color;
        Ok(())
    }

    /// Shader source used as an emissive material, if any
    pub fn source<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<Option<String>> {
        Ok(self.data(engine)?.source.clone())
    }

    /// Set or clear the emissive shader source
    pub fn set_source<E: SceneEngine + ?Sized>(&self, engine: &mut E, source: Option<String>) -> SceneResult<()> {
        self.data_mut(engine)?.source = source;
        Ok(())
    }

    /// Viewing angles `(y, x)` in radians
    pub fn field_of_view<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<[f32; 2]> {
        Ok(self.data(engine)?.field_of_view)
    }

    /// Set the viewing angles
    pub fn set_field_of_view<E: SceneEngine + ?Sized>(&self, engine: &mut E, fov: [f32; 2]) -> SceneResult<()> {
        self.data_mut(engine)?.field_of_view = fov;
        Ok(())
    }

    /// Image size `(y, x)` in pixels
    pub fn resolution<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<[u32; 2]> {
        Ok(self.data(engine)?.resolution)
    }

    /// Set the image size
    pub fn set_resolution<E: SceneEngine + ?Sized>(&self, engine: &mut E, resolution: [u32; 2]) -> SceneResult<()> {
        self.data_mut(engine)?.resolution = resolution;
        Ok(())
    }

    /// Render pass to produce
    pub fn render_pass<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<String> {
        Ok(self.data(engine)?.render_pass.clone())
    }

    /// Set the render pass
    pub fn set_render_pass<E: SceneEngine + ?Sized>(&self, engine: &mut E, pass: &str) -> SceneResult<()> {
        self.data_mut(engine)?.render_pass = pass.to_string();
        Ok(())
    }

    /// Render engine to use
    pub fn render_engine<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<String> {
        Ok(self.data(engine)?.render_engine.clone())
    }

    /// Set the render engine
    pub fn set_render_engine<E: SceneEngine + ?Sized>(&self, engine: &mut E, render_engine: &str) -> SceneResult<()> {
        self.data_mut(engine)?.render_engine = render_engine.to_string();
        Ok(())
    }
}

impl From<Lamp> for Prop {
    fn from(lamp: Lamp) -> Self {
        lamp.prop
    }
}

impl Resource for Lamp {
    type Key = ObjectKey;

    fn key(&self) -> ObjectKey {
        self.prop.key()
    }

    fn identifier<'e, E: SceneEngine + ?Sized>(&self, engine: &'e E) -> SceneResult<&'e str> {
        self.prop.identifier(engine)
    }
}
