//! Reading and writing scenes through the engine's whole-session files
//!
//! The engine can only dump the entire session, under whatever identifiers
//! it currently assigns. Writing one scene therefore temporarily rewrites the
//! session so that the dump contains exactly that scene, first in the file,
//! with every prop stored under its logical name:
//!
//! 1. The target scene is renamed to the scene marker. Other scenes whose
//!    names sort at or before the marker are moved to scratch names first.
//! 2. Every other scene's members are detached.
//! 3. Every registered prop is renamed to its logical name. Props and
//!    unrelated objects standing in the way are evacuated to scratch names.
//! 4. The session is dumped.
//!
//! Each applied step pushes its inverse onto a `SessionRewrite` stack,
//! which is unwound in reverse on every exit path, including early returns
//! and panics.

use std::collections::HashSet;
use std::path::Path;

use super::registry::SceneRegistry;
use super::scene::Scene;
use crate::core::config::SessionConfig;
use crate::engine::{ObjectKey, SceneEngine, SceneKey};
use crate::error::{SceneError, SceneResult};
use crate::resource::Resource;

/// Read the first scene of a project file into the engine session
pub fn read_scene<E: SceneEngine + ?Sized>(engine: &mut E, path: impl AsRef<Path>) -> SceneResult<Scene> {
    read_scene_with(engine, path, SessionConfig::default())
}

/// Read the first scene of a project file with explicit session settings
///
/// Objects are stored in the file under their logical names. The engine may
/// assign different identifiers on collision; the registry maps the stored
/// names to whatever identifiers were assigned.
pub fn read_scene_with<E: SceneEngine + ?Sized>(
    engine: &mut E,
    path: impl AsRef<Path>,
    config: SessionConfig,
) -> SceneResult<Scene> {
    config.validate()?;
    let path = path.as_ref();
    log::info!("Reading scene from {}", path.display());

    let report = engine.load_merge(path)?;
    let registry = SceneRegistry::from_merge(&config, &report.objects);
    let renamed = report
        .objects
        .iter()
        .filter(|o| o.stored_identifier != o.identifier)
        .count();

    log::info!(
        "Read scene '{}' with {} prop(s), {} renamed by the engine",
        engine.scene_name(report.scene)?,
        registry.size(),
        renamed
    );
    Ok(Scene::from_parts(report.scene, registry, config))
}

/// Write `scene` to a project file
///
/// The session is restored before returning, whether or not the write
/// succeeded. A failed write reports the write error; failures during
/// restoration are logged and reported only if the write itself succeeded.
pub fn write_scene<E: SceneEngine + ?Sized>(
    engine: &mut E,
    path: impl AsRef<Path>,
    scene: &Scene,
) -> SceneResult<()> {
    let path = path.as_ref();
    let config = scene.config();
    log::info!(
        "Writing scene '{}' ({} prop(s)) to {}",
        scene.identifier(&*engine)?,
        scene.len(),
        path.display()
    );

    // Resolve everything before touching the session
    let mut targets = Vec::with_capacity(scene.len());
    for (name, identifier) in scene.entries() {
        let key = engine.find_object(identifier).ok_or_else(|| {
            SceneError::EngineState(format!("'{name}' is bound to missing object '{identifier}'"))
        })?;
        targets.push((key, name.to_string()));
    }

    let mut rewrite = SessionRewrite::new(engine, &config.scratch_prefix);
    let written = rewrite_and_save(&mut rewrite, scene.key(), &config.scene_marker, &targets, path);
    let restored = rewrite.finish();

    written?;
    restored?;
    log::info!("Wrote scene to {}", path.display());
    Ok(())
}

fn rewrite_and_save<E: SceneEngine + ?Sized>(
    rewrite: &mut SessionRewrite<'_, E>,
    target: SceneKey,
    marker: &str,
    props: &[(ObjectKey, String)],
    path: &Path,
) -> SceneResult<()> {
    rewrite.claim_marker(target, marker)?;

    let others: Vec<SceneKey> = rewrite.engine.scenes().into_iter().filter(|&s| s != target).collect();
    for scene in others {
        rewrite.detach(scene)?;
    }

    rewrite.substitute(props)?;
    rewrite.engine.save_session(path)?;
    Ok(())
}

/// Inverse of one applied rewrite step
#[derive(Debug)]
enum Undo {
    /// Give a scene its name back
    SceneName { scene: SceneKey, name: String },
    /// Link detached members back, in their original order
    Relink { scene: SceneKey, members: Vec<ObjectKey> },
    /// Give renamed objects their identifiers back
    Identifiers(Vec<(ObjectKey, String)>),
}

/// Temporary rewrite of the engine session, undone when dropped
struct SessionRewrite<'a, E: SceneEngine + ?Sized> {
    engine: &'a mut E,
    scratch_scene: String,
    scratch_object: String,
    undo: Vec<Undo>,
}

impl<'a, E: SceneEngine + ?Sized> SessionRewrite<'a, E> {
    fn new(engine: &'a mut E, scratch_prefix: &str) -> Self {
        Self {
            engine,
            scratch_scene: format!("{scratch_prefix}.scene"),
            scratch_object: format!("{scratch_prefix}.object"),
            undo: Vec::new(),
        }
    }

    /// Rename `target` to `marker`, so it is the first scene of the file
    fn claim_marker(&mut self, target: SceneKey, marker: &str) -> SceneResult<()> {
        for scene in self.engine.scenes() {
            if scene == target || self.engine.scene_name(scene)? > marker {
                continue;
            }
            let assigned = self.rename_scene(scene, &self.scratch_scene.clone())?;
            if assigned.as_str() <= marker {
                return Err(SceneError::EngineState(format!(
                    "scratch scene name '{assigned}' does not sort after '{marker}'"
                )));
            }
        }

        let assigned = self.rename_scene(target, marker)?;
        if assigned != marker {
            return Err(SceneError::EngineState(format!(
                "scene marker '{marker}' was assigned as '{assigned}'"
            )));
        }
        Ok(())
    }

    fn rename_scene(&mut self, scene: SceneKey, name: &str) -> SceneResult<String> {
        let original = self.engine.scene_name(scene)?.to_string();
        let assigned = self.engine.rename_scene(scene, name)?;
        log::debug!("Scene '{original}' renamed to '{assigned}' for writing");
        self.undo.push(Undo::SceneName { scene, name: original });
        Ok(assigned)
    }

    /// Unlink every member of `scene`
    fn detach(&mut self, scene: SceneKey) -> SceneResult<()> {
        let members = self.engine.members(scene)?.to_vec();
        if members.is_empty() {
            return Ok(());
        }
        self.undo.push(Undo::Relink { scene, members: members.clone() });
        for object in members {
            self.engine.unlink(scene, object)?;
        }
        Ok(())
    }

    /// Rename every object in `props` to its logical name
    ///
    /// Everything that has to move, including objects holding a wanted
    /// name, goes to a scratch identifier first, so no rename can collide
    /// with an identifier that is about to be vacated.
    fn substitute(&mut self, props: &[(ObjectKey, String)]) -> SceneResult<()> {
        let mut originals = Vec::new();
        let mut movers = Vec::new();
        for (key, name) in props {
            let identifier = self.engine.object_identifier(*key)?;
            if identifier != name.as_str() {
                originals.push((*key, identifier.to_string()));
                movers.push((*key, name.as_str()));
            }
        }
        if movers.is_empty() {
            return Ok(());
        }

        let moving: HashSet<ObjectKey> = movers.iter().map(|(key, _)| *key).collect();
        for (_, name) in &movers {
            if let Some(blocker) = self.engine.find_object(name) {
                if !moving.contains(&blocker) {
                    let identifier = self.engine.object_identifier(blocker)?.to_string();
                    log::debug!("Evacuating '{identifier}' which holds a logical name");
                    originals.push((blocker, identifier));
                }
            }
        }

        let evacuate: Vec<ObjectKey> = originals.iter().map(|(key, _)| *key).collect();
        self.undo.push(Undo::Identifiers(originals));

        for key in evacuate {
            self.engine.rename_object(key, &self.scratch_object)?;
        }
        for (key, name) in movers {
            let assigned = self.engine.rename_object(key, name)?;
            if assigned != name {
                return Err(SceneError::EngineState(format!(
                    "logical name '{name}' was assigned as '{assigned}'"
                )));
            }
        }
        Ok(())
    }

    /// Undo every applied step, newest first, returning the first failure
    fn unwind(&mut self) -> SceneResult<()> {
        let mut first_error = None;
        while let Some(step) = self.undo.pop() {
            log::debug!("Rolling back {step:?}");
            if let Err(err) = self.revert(step) {
                log::error!("Rollback step failed: {err}");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn revert(&mut self, step: Undo) -> SceneResult<()> {
        match step {
            Undo::SceneName { scene, name } => {
                let assigned = self.engine.rename_scene(scene, &name)?;
                if assigned != name {
                    return Err(SceneError::EngineState(format!(
                        "scene '{name}' came back as '{assigned}'"
                    )));
                }
            }
            Undo::Relink { scene, members } => {
                for object in members {
                    self.engine.link(scene, object)?;
                }
            }
            Undo::Identifiers(originals) => {
                for (key, _) in &originals {
                    self.engine.rename_object(*key, &self.scratch_object)?;
                }
                for (key, identifier) in &originals {
                    let assigned = self.engine.rename_object(*key, identifier)?;
                    if &assigned != identifier {
                        return Err(SceneError::EngineState(format!(
                            "object '{identifier}' came back as '{assigned}'"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Restore the session, returning the first restoration failure
    fn finish(mut self) -> SceneResult<()> {
        self.unwind()
    }
}

impl<E: SceneEngine + ?Sized> Drop for SessionRewrite<'_, E> {
    fn drop(&mut self) {
        if self.undo.is_empty() {
            return;
        }
        log::warn!("Session rewrite interrupted, rolling back {} step(s)", self.undo.len());
        if let Err(err) = self.unwind() {
            log::error!("Session could not be fully restored: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MemorySession, ObjectKind};

    #[test]
    fn test_dropped_rewrite_restores_session() {
        let mut session = MemorySession::new();
        let scene = session.create_scene();
        let other = session.create_scene();
        let a = session.create_object(ObjectKind::Empty);
        let b = session.create_object(ObjectKind::Empty);
        session.link(scene, a).unwrap();
        session.link(other, b).unwrap();
        session.link(other, a).unwrap();

        {
            let mut rewrite = SessionRewrite::new(&mut session, "~tmp");
            rewrite.claim_marker(scene, "0").unwrap();
            rewrite.detach(other).unwrap();
            rewrite
                .substitute(&[(a, "Object.001".to_string())])
                .unwrap();
            assert_eq!(rewrite.engine.scene_name(scene).unwrap(), "0");
            assert_eq!(rewrite.engine.object_identifier(a).unwrap(), "Object.001");
            assert!(rewrite.engine.members(other).unwrap().is_empty());
        }

        assert_eq!(session.scene_name(scene).unwrap(), "Scene");
        assert_eq!(session.members(other).unwrap(), &[b, a]);
        assert_eq!(session.object_identifier(a).unwrap(), "Object");
        assert_eq!(session.object_identifier(b).unwrap(), "Object.001");
    }

    #[test]
    fn test_substitute_swaps_identifiers() {
        let mut session = MemorySession::new();
        let a = session.create_object(ObjectKind::Empty);
        let b = session.create_object(ObjectKind::Empty);

        let mut rewrite = SessionRewrite::new(&mut session, "~tmp");
        rewrite
            .substitute(&[(a, "Object.001".to_string()), (b, "Object".to_string())])
            .unwrap();
        assert_eq!(rewrite.engine.object_identifier(a).unwrap(), "Object.001");
        assert_eq!(rewrite.engine.object_identifier(b).unwrap(), "Object");
        rewrite.finish().unwrap();

        assert_eq!(session.object_identifier(a).unwrap(), "Object");
        assert_eq!(session.object_identifier(b).unwrap(), "Object.001");
    }

    #[test]
    fn test_claim_marker_moves_scenes_sorting_first() {
        let mut session = MemorySession::new();
        let target = session.create_scene();
        let holder = session.create_scene();
        let early = session.create_scene();
        session.rename_scene(holder, "0").unwrap();
        session.rename_scene(early, "!early").unwrap();

        let mut rewrite = SessionRewrite::new(&mut session, "~tmp");
        rewrite.claim_marker(target, "0").unwrap();
        assert_eq!(rewrite.engine.scene_name(target).unwrap(), "0");
        assert!(rewrite.engine.scene_name(holder).unwrap().starts_with("~tmp.scene"));
        assert!(rewrite.engine.scene_name(early).unwrap().starts_with("~tmp.scene"));
        rewrite.finish().unwrap();

        assert_eq!(session.scene_name(target).unwrap(), "Scene");
        assert_eq!(session.scene_name(holder).unwrap(), "0");
        assert_eq!(session.scene_name(early).unwrap(), "!early");
    }
}
