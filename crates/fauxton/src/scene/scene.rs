//! Scenes: collections of props addressed by logical name

use std::path::Path;

use super::persistence;
use super::registry::SceneRegistry;
use crate::core::config::SessionConfig;
use crate::engine::{SceneEngine, SceneKey};
use crate::error::SceneResult;
use crate::resource::{Prop, Resource};

/// A collection of graphical objects
///
/// | Operation              | Meaning                                         |
/// |------------------------|-------------------------------------------------|
/// | `len()`                | number of props in the scene                    |
/// | `names()`              | logical names of the props                      |
/// | `contains(n)`          | whether a prop is stored under `n`              |
/// | `lookup(e, n)`         | prop stored under `n`                           |
/// | `bind(e, n, p)`        | store `p` under `n`, replacing any previous prop|
/// | `unbind(e, n)`         | remove the prop stored under `n`                |
/// | `add(e, p)` / `remove` | store under a generated name / remove by prop   |
#[derive(Debug)]
pub struct Scene {
    key: SceneKey,
    registry: SceneRegistry,
    config: SessionConfig,
}

impl Scene {
    /// Create an empty scene in the engine with default settings
    pub fn new<E: SceneEngine + ?Sized>(engine: &mut E) -> Self {
        Self::create(engine, SessionConfig::default())
    }

    /// Create an empty scene in the engine with the given settings
    pub fn with_config<E: SceneEngine + ?Sized>(engine: &mut E, config: SessionConfig) -> SceneResult<Self> {
        config.validate()?;
        Ok(Self::create(engine, config))
    }

    fn create<E: SceneEngine + ?Sized>(engine: &mut E, config: SessionConfig) -> Self {
        let registry = SceneRegistry::new(&config);
        let key = engine.create_scene();
        log::debug!("Created scene '{}'", engine.scene_name(key).unwrap_or("?"));
        Self { key, registry, config }
    }

    pub(crate) fn from_parts(key: SceneKey, registry: SceneRegistry, config: SessionConfig) -> Self {
        Self { key, registry, config }
    }

    /// Read the first scene of a project file into the engine session
    pub fn read<E: SceneEngine + ?Sized>(engine: &mut E, path: impl AsRef<Path>) -> SceneResult<Self> {
        persistence::read_scene(engine, path)
    }

    /// Write this scene to a project file
    pub fn write<E: SceneEngine + ?Sized>(&self, engine: &mut E, path: impl AsRef<Path>) -> SceneResult<()> {
        persistence::write_scene(engine, path, self)
    }

    /// Name-to-identifier index
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    /// Session settings this scene reads and writes with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of props in the scene
    pub fn len(&self) -> usize {
        self.registry.size()
    }

    /// Whether the scene holds no props
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical names of the props
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// Logical names of the props, detached from the scene's borrow
    pub fn name_snapshot(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    /// `(logical name, identifier)` pairs
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.registry.entries()
    }

    /// Whether a prop is stored under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Prop stored under `name`
    pub fn lookup<E: SceneEngine + ?Sized>(&self, engine: &E, name: &str) -> SceneResult<Prop> {
        self.registry.lookup(engine, name)
    }

    /// Store `prop` under `name`, replacing any previous prop
    pub fn bind<E: SceneEngine + ?Sized>(&mut self, engine: &mut E, name: &str, prop: impl Into<Prop>) -> SceneResult<()> {
        self.registry.bind(engine, self.key, name, prop.into())
    }

    /// Remove the prop stored under `name`, returning it
    pub fn unbind<E: SceneEngine + ?Sized>(&mut self, engine: &mut E, name: &str) -> SceneResult<Prop> {
        self.registry.unbind(engine, self.key, name)
    }

    /// Store `prop` under a generated name, returning the name
    pub fn add<E: SceneEngine + ?Sized>(&mut self, engine: &mut E, prop: impl Into<Prop>) -> SceneResult<String> {
        self.registry.add(engine, self.key, prop.into())
    }

    /// Remove `prop` from the scene, returning the name it was stored under
    pub fn remove<E: SceneEngine + ?Sized>(&mut self, engine: &mut E, prop: impl Into<Prop>) -> SceneResult<String> {
        self.registry.remove(engine, self.key, prop.into())
    }

    /// Forget props the engine has deleted or renamed, returning their names
    pub fn prune_stale<E: SceneEngine + ?Sized>(&mut self, engine: &mut E) -> SceneResult<Vec<String>> {
        self.registry.prune_stale(engine, self.key)
    }

    /// Current frame
    pub fn time<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<f32> {
        Ok(engine.frame(self.key)?)
    }

    /// Jump to a frame
    pub fn set_time<E: SceneEngine + ?Sized>(&self, engine: &mut E, time: f32) -> SceneResult<()> {
        Ok(engine.set_frame(self.key, time)?)
    }
}

impl Resource for Scene {
    type Key = SceneKey;

    fn key(&self) -> SceneKey {
        self.key
    }

    fn identifier<'e, E: SceneEngine + ?Sized>(&self, engine: &'e E) -> SceneResult<&'e str> {
        Ok(engine.scene_name(self.key)?)
    }
}
