//! Logical-name registry
//!
//! Maps the caller's logical names to the engine's object identifiers and
//! back. The two maps are exact inverses after every public operation, and
//! every entry corresponds to one member of the owning scene.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::SessionConfig;
use crate::engine::{MergedObject, SceneEngine, SceneKey};
use crate::error::{SceneError, SceneResult};
use crate::resource::{Prop, Resource};

/// Size of the domain random logical names are drawn from (33 bits)
pub const NAME_SPACE: u64 = 1 << 33;

/// Bidirectional logical-name index owned by one scene
#[derive(Debug)]
pub struct SceneRegistry {
    /// logical name -> identifier
    global_names: HashMap<String, String>,
    /// identifier -> logical name
    local_names: HashMap<String, String>,
    rng: StdRng,
    max_attempts: u32,
    /// Identifiers under this prefix are held by the save protocol
    scratch_prefix: String,
}

impl SceneRegistry {
    /// Create an empty registry
    pub fn new(config: &SessionConfig) -> Self {
        let rng = match config.name_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            global_names: HashMap::new(),
            local_names: HashMap::new(),
            rng,
            max_attempts: config.max_name_attempts,
            scratch_prefix: config.scratch_prefix.clone(),
        }
    }

    /// Rebuild a registry from the objects reported by a merge-load
    ///
    /// Each object's identifier inside the file is its logical name.
    pub(crate) fn from_merge(config: &SessionConfig, merged: &[MergedObject]) -> Self {
        let mut registry = Self::new(config);
        for object in merged {
            registry.insert_pair(&object.stored_identifier, &object.identifier);
        }
        registry
    }

    /// Number of registered props
    pub fn size(&self) -> usize {
        self.global_names.len()
    }

    /// Logical names currently registered, in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.global_names.keys().map(String::as_str)
    }

    /// `(logical name, identifier)` pairs
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.global_names.iter().map(|(n, i)| (n.as_str(), i.as_str()))
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.global_names.contains_key(name)
    }

    /// Identifier bound to `name`
    pub fn identifier(&self, name: &str) -> Option<&str> {
        self.global_names.get(name).map(String::as_str)
    }

    /// Logical name bound to `identifier`
    pub fn logical_name(&self, identifier: &str) -> Option<&str> {
        self.local_names.get(identifier).map(String::as_str)
    }

    /// Resolve `name` to the live prop
    pub fn lookup<E: SceneEngine + ?Sized>(&self, engine: &E, name: &str) -> SceneResult<Prop> {
        let identifier = self
            .global_names
            .get(name)
            .ok_or_else(|| SceneError::NotFound(name.to_string()))?;
        resolve(engine, name, identifier)
    }

    /// Register `prop` under `name`, replacing whatever `name` was bound to
    ///
    /// The previously bound prop leaves the scene but stays in the engine
    /// store. A prop already registered under another name is moved. Names
    /// the engine cannot hold as identifiers are rejected.
    pub fn bind<E: SceneEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        scene: SceneKey,
        name: &str,
        prop: Prop,
    ) -> SceneResult<()> {
        self.check_name(name)?;
        let identifier = prop.identifier(&*engine)?.to_string();

        if let Some(old) = self.global_names.get(name).cloned() {
            if old != identifier {
                match engine.find_object(&old) {
                    Some(key) => engine.unlink(scene, key)?,
                    None => log::warn!("Replacing '{name}': bound object '{old}' no longer exists"),
                }
            }
            self.remove_pair(name);
        }
        if let Some(previous) = self.local_names.get(&identifier).cloned() {
            log::debug!("Moving '{identifier}' from '{previous}' to '{name}'");
            self.remove_pair(&previous);
        }

        engine.link(scene, prop.key())?;
        self.insert_pair(name, &identifier);
        log::debug!("Bound '{name}' -> '{identifier}'");
        Ok(())
    }

    /// Remove `name` from the scene, returning the prop it was bound to
    pub fn unbind<E: SceneEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        scene: SceneKey,
        name: &str,
    ) -> SceneResult<Prop> {
        let prop = self.lookup(engine, name)?;
        engine.unlink(scene, prop.key())?;
        self.remove_pair(name);
        log::debug!("Unbound '{name}'");
        Ok(prop)
    }

    /// Register `prop` under a fresh random name, which is returned
    pub fn add<E: SceneEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        scene: SceneKey,
        prop: Prop,
    ) -> SceneResult<String> {
        let name = self.unused_name()?;
        self.bind(engine, scene, &name, prop)?;
        Ok(name)
    }

    /// Remove `prop` from the scene, returning the name it was registered under
    pub fn remove<E: SceneEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        scene: SceneKey,
        prop: Prop,
    ) -> SceneResult<String> {
        let identifier = prop.identifier(&*engine)?;
        let name = self
            .local_names
            .get(identifier)
            .cloned()
            .ok_or_else(|| SceneError::NotFound(format!("object '{identifier}'")))?;
        self.unbind(engine, scene, &name)?;
        Ok(name)
    }

    /// Drop entries whose identifiers the engine no longer knows
    ///
    /// Scene members left without an entry, such as objects renamed behind
    /// the registry's back, are unlinked from `scene`.
    pub fn prune_stale<E: SceneEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        scene: SceneKey,
    ) -> SceneResult<Vec<String>> {
        let stale: Vec<String> = self
            .global_names
            .iter()
            .filter(|(_, identifier)| engine.find_object(identifier).is_none())
            .map(|(name, _)| name.clone())
            .collect();
        for name in &stale {
            log::warn!("Pruning '{name}': object no longer exists");
            self.remove_pair(name);
        }

        let mut orphans = Vec::new();
        for &key in engine.members(scene)? {
            if !self.local_names.contains_key(engine.object_identifier(key)?) {
                orphans.push(key);
            }
        }
        for key in orphans {
            log::debug!("Unlinking unregistered member '{}'", engine.object_identifier(key)?);
            engine.unlink(scene, key)?;
        }
        Ok(stale)
    }

    fn check_name(&self, name: &str) -> SceneResult<()> {
        if name.is_empty() {
            return Err(SceneError::InvalidName {
                name: name.to_string(),
                reason: "logical names must not be empty".to_string(),
            });
        }
        if name.starts_with(&self.scratch_prefix) {
            return Err(SceneError::InvalidName {
                name: name.to_string(),
                reason: format!("prefix '{}' is reserved for saving", self.scratch_prefix),
            });
        }
        Ok(())
    }

    fn unused_name(&mut self) -> SceneResult<String> {
        for _ in 0..self.max_attempts {
            let name = self.rng.gen_range(0..NAME_SPACE).to_string();
            if !self.contains(&name) {
                return Ok(name);
            }
        }
        Err(SceneError::CollisionExhausted { attempts: self.max_attempts })
    }

    fn insert_pair(&mut self, name: &str, identifier: &str) {
        self.global_names.insert(name.to_string(), identifier.to_string());
        self.local_names.insert(identifier.to_string(), name.to_string());
    }

    fn remove_pair(&mut self, name: &str) {
        if let Some(identifier) = self.global_names.remove(name) {
            self.local_names.remove(&identifier);
        }
    }

    /// Panic unless both maps are exact inverses
    #[cfg(test)]
    pub(crate) fn assert_bijection(&self) {
        assert_eq!(self.global_names.len(), self.local_names.len());
        for (name, identifier) in &self.global_names {
            assert_eq!(self.local_names.get(identifier), Some(name));
        }
    }
}

fn resolve<E: SceneEngine + ?Sized>(engine: &E, name: &str, identifier: &str) -> SceneResult<Prop> {
    engine
        .find_object(identifier)
        .map(Prop::from_key)
        .ok_or_else(|| {
            SceneError::EngineState(format!("'{name}' is bound to missing object '{identifier}'"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemorySession;

    fn setup() -> (MemorySession, SceneKey, SceneRegistry) {
        let mut session = MemorySession::new();
        let scene = session.create_scene();
        let registry = SceneRegistry::new(&SessionConfig::default().with_name_seed(42));
        (session, scene, registry)
    }

    #[test]
    fn test_bind_then_lookup() {
        let (mut session, scene, mut registry) = setup();
        let prop = Prop::new(&mut session);

        registry.bind(&mut session, scene, "alpha", prop).unwrap();
        assert_eq!(registry.lookup(&session, "alpha").unwrap(), prop);
        assert_eq!(registry.identifier("alpha"), Some("Object"));
        assert_eq!(registry.logical_name("Object"), Some("alpha"));
        assert_eq!(session.members(scene).unwrap(), &[prop.key()]);
        registry.assert_bijection();
    }

    #[test]
    fn test_bind_rejects_names_the_file_cannot_hold() {
        let (mut session, scene, mut registry) = setup();
        let prop = Prop::new(&mut session);

        for name in ["", "~fauxton.object", "~fauxton"] {
            assert!(matches!(
                registry.bind(&mut session, scene, name, prop),
                Err(SceneError::InvalidName { .. })
            ));
        }
        assert_eq!(registry.size(), 0);
        assert!(session.members(scene).unwrap().is_empty());
    }

    #[test]
    fn test_lookup_missing_is_not_found() {
        let (session, _, registry) = setup();
        assert!(matches!(registry.lookup(&session, "ghost"), Err(SceneError::NotFound(_))));
    }

    #[test]
    fn test_rebinding_name_detaches_previous_prop() {
        let (mut session, scene, mut registry) = setup();
        let a = Prop::new(&mut session);
        let b = Prop::new(&mut session);

        registry.bind(&mut session, scene, "light1", a).unwrap();
        registry.bind(&mut session, scene, "light1", b).unwrap();

        assert_eq!(registry.lookup(&session, "light1").unwrap(), b);
        assert_eq!(registry.size(), 1);
        assert_eq!(session.members(scene).unwrap(), &[b.key()]);
        assert!(session.object(a.key()).is_ok());
        registry.assert_bijection();
    }

    #[test]
    fn test_binding_registered_prop_moves_it() {
        let (mut session, scene, mut registry) = setup();
        let prop = Prop::new(&mut session);

        registry.bind(&mut session, scene, "old", prop).unwrap();
        registry.bind(&mut session, scene, "new", prop).unwrap();

        assert!(!registry.contains("old"));
        assert_eq!(registry.lookup(&session, "new").unwrap(), prop);
        assert_eq!(registry.size(), 1);
        assert_eq!(session.members(scene).unwrap().len(), 1);
        registry.assert_bijection();
    }

    #[test]
    fn test_unbind_missing_does_not_mutate() {
        let (mut session, scene, mut registry) = setup();
        let prop = Prop::new(&mut session);
        registry.bind(&mut session, scene, "alpha", prop).unwrap();

        assert!(matches!(
            registry.unbind(&mut session, scene, "beta"),
            Err(SceneError::NotFound(_))
        ));
        assert_eq!(registry.size(), 1);
        assert_eq!(session.members(scene).unwrap().len(), 1);
    }

    #[test]
    fn test_add_generates_numeric_names() {
        let (mut session, scene, mut registry) = setup();
        let a = Prop::new(&mut session);
        let b = Prop::new(&mut session);

        let n1 = registry.add(&mut session, scene, a).unwrap();
        let n2 = registry.add(&mut session, scene, b).unwrap();

        assert_ne!(n1, n2);
        for name in [&n1, &n2] {
            assert!(name.parse::<u64>().unwrap() < NAME_SPACE);
        }
        registry.assert_bijection();
    }

    #[test]
    fn test_add_then_remove_restores_size() {
        let (mut session, scene, mut registry) = setup();
        let keep = Prop::new(&mut session);
        let temp = Prop::new(&mut session);
        registry.bind(&mut session, scene, "keep", keep).unwrap();

        let name = registry.add(&mut session, scene, temp).unwrap();
        assert_eq!(registry.size(), 2);
        assert_eq!(registry.remove(&mut session, scene, temp).unwrap(), name);

        assert_eq!(registry.size(), 1);
        assert!(registry.contains("keep"));
        assert_eq!(registry.logical_name("Object.001"), None);
        registry.assert_bijection();
    }

    #[test]
    fn test_remove_unregistered_prop_is_not_found() {
        let (mut session, scene, mut registry) = setup();
        let prop = Prop::new(&mut session);
        assert!(matches!(
            registry.remove(&mut session, scene, prop),
            Err(SceneError::NotFound(_))
        ));
    }

    #[test]
    fn test_name_generation_exhaustion() {
        let config = SessionConfig {
            max_name_attempts: 3,
            name_seed: Some(1),
            ..Default::default()
        };
        let mut registry = SceneRegistry::new(&config);
        // Same seed replays the same draws
        let mut replay = StdRng::seed_from_u64(1);
        for _ in 0..3 {
            let name = replay.gen_range(0..NAME_SPACE).to_string();
            registry.insert_pair(&name, &format!("id-{name}"));
        }

        assert!(matches!(
            registry.unused_name(),
            Err(SceneError::CollisionExhausted { attempts: 3 })
        ));
    }

    #[test]
    fn test_deleted_object_surfaces_engine_state_and_prunes() {
        let (mut session, scene, mut registry) = setup();
        let prop = Prop::new(&mut session);
        registry.bind(&mut session, scene, "alpha", prop).unwrap();
        session.delete_object(prop.key()).unwrap();

        assert!(matches!(registry.lookup(&session, "alpha"), Err(SceneError::EngineState(_))));
        assert_eq!(registry.prune_stale(&mut session, scene).unwrap(), vec!["alpha".to_string()]);
        assert_eq!(registry.size(), 0);
        registry.assert_bijection();
    }
}
