//! In-process engine session
//!
//! Holds every object, action and scene in slot maps keyed by stable handles,
//! with one identifier namespace per datablock family shared by the whole
//! session.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::file::{ActionRecord, ObjectRecord, SceneRecord, SessionDocument};
use super::namespace::Namespace;
use super::{
    ActionData, ActionKey, EngineError, EngineResult, MergeReport, MergedObject, ObjectData,
    ObjectKey, ObjectKind, SceneEngine, SceneKey,
};
use crate::foundation::collections::HandleMap;

#[derive(Debug)]
struct ObjectBlock {
    name: String,
    data: ObjectData,
}

#[derive(Debug)]
struct ActionBlock {
    name: String,
    data: ActionData,
}

#[derive(Debug)]
struct SceneBlock {
    name: String,
    frame: f32,
    members: Vec<ObjectKey>,
}

/// Engine session kept entirely in memory
#[derive(Debug)]
pub struct MemorySession {
    objects: HandleMap<ObjectKey, ObjectBlock>,
    actions: HandleMap<ActionKey, ActionBlock>,
    scenes: HandleMap<SceneKey, SceneBlock>,
    scene_order: Vec<SceneKey>,
    object_names: Namespace<ObjectKey>,
    action_names: Namespace<ActionKey>,
    scene_names: Namespace<SceneKey>,
}

impl MemorySession {
    /// Create an empty session
    pub fn new() -> Self {
        Self {
            objects: HandleMap::with_key(),
            actions: HandleMap::with_key(),
            scenes: HandleMap::with_key(),
            scene_order: Vec::new(),
            object_names: Namespace::new("Object"),
            action_names: Namespace::new("Action"),
            scene_names: Namespace::new("Scene"),
        }
    }

    /// Number of objects in the session, linked or not
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of actions in the session
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    fn insert_object(&mut self, requested: &str, data: ObjectData) -> ObjectKey {
        let key = self.objects.insert(ObjectBlock { name: String::new(), data });
        let name = self.object_names.claim(requested, key);
        self.objects[key].name = name;
        key
    }

    fn insert_action(&mut self, requested: &str, data: ActionData) -> ActionKey {
        let key = self.actions.insert(ActionBlock { name: String::new(), data });
        let name = self.action_names.claim(requested, key);
        self.actions[key].name = name;
        key
    }

    fn insert_scene(&mut self, requested: &str, frame: f32) -> SceneKey {
        let key = self.scenes.insert(SceneBlock {
            name: String::new(),
            frame,
            members: Vec::new(),
        });
        let name = self.scene_names.claim(requested, key);
        self.scenes[key].name = name;
        self.scene_order.push(key);
        key
    }

    fn scene_block(&self, key: SceneKey) -> EngineResult<&SceneBlock> {
        self.scenes.get(key).ok_or_else(|| EngineError::stale("scene"))
    }

    fn scene_block_mut(&mut self, key: SceneKey) -> EngineResult<&mut SceneBlock> {
        self.scenes.get_mut(key).ok_or_else(|| EngineError::stale("scene"))
    }

    fn object_block(&self, key: ObjectKey) -> EngineResult<&ObjectBlock> {
        self.objects.get(key).ok_or_else(|| EngineError::stale("object"))
    }

    fn action_block(&self, key: ActionKey) -> EngineResult<&ActionBlock> {
        self.actions.get(key).ok_or_else(|| EngineError::stale("action"))
    }

    /// Snapshot the session as it would be written to disk
    pub fn document(&self) -> SessionDocument {
        let mut scenes: Vec<&SceneBlock> = self.scenes.values().collect();
        scenes.sort_by(|a, b| a.name.cmp(&b.name));

        let mut doc = SessionDocument::default();
        let mut written_objects = HashSet::new();
        let mut written_actions = HashSet::new();

        for scene in scenes {
            let mut members = Vec::with_capacity(scene.members.len());
            for &key in &scene.members {
                let Some(block) = self.objects.get(key) else { continue };
                members.push(block.name.clone());
                if !written_objects.insert(key) {
                    continue;
                }

                let action = block.data.action().and_then(|a| self.actions.get(a).map(|ab| (a, ab)));
                if let Some((action_key, action_block)) = action {
                    if written_actions.insert(action_key) {
                        doc.actions.push(ActionRecord {
                            name: action_block.name.clone(),
                            data: action_block.data.clone(),
                        });
                    }
                }
                doc.objects.push(ObjectRecord::capture(
                    &block.name,
                    &block.data,
                    action.map(|(_, ab)| ab.name.clone()),
                ));
            }
            doc.scenes.push(SceneRecord {
                name: scene.name.clone(),
                frame: scene.frame,
                members,
            });
        }
        doc
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneEngine for MemorySession {
    fn create_object(&mut self, kind: ObjectKind) -> ObjectKey {
        self.insert_object(kind.default_name(), ObjectData::new(kind))
    }

    fn create_action(&mut self) -> ActionKey {
        self.insert_action("", ActionData::default())
    }

    fn create_scene(&mut self) -> SceneKey {
        self.insert_scene("", 1.0)
    }

    fn delete_object(&mut self, key: ObjectKey) -> EngineResult<()> {
        let block = self.objects.remove(key).ok_or_else(|| EngineError::stale("object"))?;
        self.object_names.release(&block.name, key);
        for scene in self.scenes.values_mut() {
            scene.members.retain(|&m| m != key);
        }
        log::debug!("Deleted object '{}'", block.name);
        Ok(())
    }

    fn objects(&self) -> Vec<ObjectKey> {
        self.objects.keys().collect()
    }

    fn object_identifier(&self, key: ObjectKey) -> EngineResult<&str> {
        Ok(&self.object_block(key)?.name)
    }

    fn rename_object(&mut self, key: ObjectKey, name: &str) -> EngineResult<String> {
        let block = self.objects.get_mut(key).ok_or_else(|| EngineError::stale("object"))?;
        let assigned = self.object_names.rename(key, &block.name, name);
        block.name.clone_from(&assigned);
        Ok(assigned)
    }

    fn find_object(&self, identifier: &str) -> Option<ObjectKey> {
        self.object_names.get(identifier)
    }

    fn object(&self, key: ObjectKey) -> EngineResult<&ObjectData> {
        Ok(&self.object_block(key)?.data)
    }

    fn object_mut(&mut self, key: ObjectKey) -> EngineResult<&mut ObjectData> {
        self.objects
            .get_mut(key)
            .map(|block| &mut block.data)
            .ok_or_else(|| EngineError::stale("object"))
    }

    fn action_identifier(&self, key: ActionKey) -> EngineResult<&str> {
        Ok(&self.action_block(key)?.name)
    }

    fn action(&self, key: ActionKey) -> EngineResult<&ActionData> {
        Ok(&self.action_block(key)?.data)
    }

    fn action_mut(&mut self, key: ActionKey) -> EngineResult<&mut ActionData> {
        self.actions
            .get_mut(key)
            .map(|block| &mut block.data)
            .ok_or_else(|| EngineError::stale("action"))
    }

    fn scenes(&self) -> Vec<SceneKey> {
        self.scene_order.clone()
    }

    fn scene_name(&self, key: SceneKey) -> EngineResult<&str> {
        Ok(&self.scene_block(key)?.name)
    }

    fn rename_scene(&mut self, key: SceneKey, name: &str) -> EngineResult<String> {
        let block = self.scenes.get_mut(key).ok_or_else(|| EngineError::stale("scene"))?;
        let assigned = self.scene_names.rename(key, &block.name, name);
        block.name.clone_from(&assigned);
        Ok(assigned)
    }

    fn find_scene(&self, name: &str) -> Option<SceneKey> {
        self.scene_names.get(name)
    }

    fn link(&mut self, scene: SceneKey, object: ObjectKey) -> EngineResult<()> {
        self.object_block(object)?;
        let block = self.scene_block_mut(scene)?;
        if !block.members.contains(&object) {
            block.members.push(object);
        }
        Ok(())
    }

    fn unlink(&mut self, scene: SceneKey, object: ObjectKey) -> EngineResult<()> {
        let block = self.scene_block_mut(scene)?;
        block.members.retain(|&m| m != object);
        Ok(())
    }

    fn members(&self, scene: SceneKey) -> EngineResult<&[ObjectKey]> {
        Ok(&self.scene_block(scene)?.members)
    }

    fn frame(&self, scene: SceneKey) -> EngineResult<f32> {
        Ok(self.scene_block(scene)?.frame)
    }

    fn set_frame(&mut self, scene: SceneKey, frame: f32) -> EngineResult<()> {
        self.scene_block_mut(scene)?.frame = frame;
        Ok(())
    }

    fn load_merge(&mut self, path: &Path) -> EngineResult<MergeReport> {
        let doc = SessionDocument::read(path)?;
        let invalid = |reason: String| EngineError::InvalidFile {
            path: path.to_path_buf(),
            reason,
        };

        let scene_record = doc
            .scenes
            .first()
            .ok_or_else(|| invalid("file contains no scene".to_string()))?;

        // Resolve everything before touching the session
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(scene_record.members.len());
        for member in &scene_record.members {
            if !seen.insert(member.as_str()) {
                continue;
            }
            let record = doc
                .object(member)
                .ok_or_else(|| invalid(format!("scene member '{member}' has no object record")))?;
            records.push(record);
        }

        let scene = self.insert_scene(&scene_record.name, scene_record.frame);
        let mut merged_actions: HashMap<&str, ActionKey> = HashMap::new();
        let mut objects = Vec::with_capacity(records.len());

        for record in records {
            let action = match record.action.as_deref() {
                Some(name) => match merged_actions.get(name) {
                    Some(&key) => Some(key),
                    None => match doc.action(name) {
                        Some(action_record) => {
                            let key = self.insert_action(&action_record.name, action_record.data.clone());
                            merged_actions.insert(name, key);
                            Some(key)
                        }
                        None => {
                            log::warn!("Object '{}' references missing action '{}'", record.name, name);
                            None
                        }
                    },
                },
                None => None,
            };

            let key = self.insert_object(&record.name, record.restore(action));
            let identifier = self.objects[key].name.clone();
            if identifier != record.name {
                log::debug!("Merged object '{}' renamed to '{}'", record.name, identifier);
            }
            self.scenes[scene].members.push(key);
            objects.push(MergedObject {
                stored_identifier: record.name.clone(),
                key,
                identifier,
            });
        }

        log::debug!(
            "Merged scene '{}' with {} object(s) from {}",
            self.scenes[scene].name,
            objects.len(),
            path.display()
        );
        Ok(MergeReport { scene, objects })
    }

    fn save_session(&self, path: &Path) -> EngineResult<()> {
        let doc = self.document();
        doc.write(path)?;
        log::debug!(
            "Saved {} scene(s), {} object(s), {} action(s) to {}",
            doc.scenes.len(),
            doc.objects.len(),
            doc.actions.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identifiers_collide_into_suffixes() {
        let mut session = MemorySession::new();
        let a = session.create_object(ObjectKind::Empty);
        let b = session.create_object(ObjectKind::Empty);
        let lamp = session.create_object(ObjectKind::Lamp);

        assert_eq!(session.object_identifier(a).unwrap(), "Object");
        assert_eq!(session.object_identifier(b).unwrap(), "Object.001");
        assert_eq!(session.object_identifier(lamp).unwrap(), "Lamp");
        assert_eq!(session.find_object("Object.001"), Some(b));
    }

    #[test]
    fn test_rename_into_taken_identifier_is_suffixed() {
        let mut session = MemorySession::new();
        let a = session.create_object(ObjectKind::Empty);
        let b = session.create_object(ObjectKind::Empty);
        session.rename_object(a, "alpha").unwrap();

        assert_eq!(session.rename_object(b, "alpha").unwrap(), "alpha.001");
        assert_eq!(session.find_object("alpha"), Some(a));
        assert_eq!(session.find_object("Object.001"), None);
    }

    #[test]
    fn test_delete_invalidates_handle_and_membership() {
        let mut session = MemorySession::new();
        let scene = session.create_scene();
        let obj = session.create_object(ObjectKind::Empty);
        session.link(scene, obj).unwrap();

        session.delete_object(obj).unwrap();
        assert!(session.members(scene).unwrap().is_empty());
        assert!(matches!(session.object(obj), Err(EngineError::StaleHandle { .. })));
        assert_eq!(session.find_object("Object"), None);
    }

    #[test]
    fn test_link_is_idempotent() {
        let mut session = MemorySession::new();
        let scene = session.create_scene();
        let obj = session.create_object(ObjectKind::Empty);
        session.link(scene, obj).unwrap();
        session.link(scene, obj).unwrap();
        assert_eq!(session.members(scene).unwrap(), &[obj]);

        session.unlink(scene, obj).unwrap();
        session.unlink(scene, obj).unwrap();
        assert!(session.members(scene).unwrap().is_empty());
    }

    #[test]
    fn test_document_skips_orphans_and_sorts_scenes() {
        let mut session = MemorySession::new();
        let first = session.create_scene();
        let second = session.create_scene();
        session.rename_scene(first, "b").unwrap();
        session.rename_scene(second, "a").unwrap();

        let linked = session.create_object(ObjectKind::Empty);
        let _orphan = session.create_object(ObjectKind::Empty);
        session.link(first, linked).unwrap();

        let doc = session.document();
        let names: Vec<_> = doc.scenes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(doc.objects.len(), 1);
        assert_eq!(doc.objects[0].name, "Object");
    }

    #[test]
    fn test_merge_renames_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.fxtn");

        let mut session = MemorySession::new();
        let scene = session.create_scene();
        let obj = session.create_object(ObjectKind::Empty);
        let action = session.create_action();
        session.object_mut(obj).unwrap().animation_data_create().action = Some(action);
        session.link(scene, obj).unwrap();
        session.save_session(&path).unwrap();

        let report = session.load_merge(&path).unwrap();
        assert_ne!(report.scene, scene);
        assert_eq!(session.scene_name(report.scene).unwrap(), "Scene.001");
        assert_eq!(report.objects.len(), 1);
        assert_eq!(report.objects[0].stored_identifier, "Object");
        assert_eq!(report.objects[0].identifier, "Object.001");

        let merged_action = session.object(report.objects[0].key).unwrap().action().unwrap();
        assert_ne!(merged_action, action);
        assert_eq!(session.action_identifier(merged_action).unwrap(), "Action.001");
        assert_eq!(session.action_count(), 2);
    }

    #[test]
    fn test_merge_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = MemorySession::new();
        let err = session.load_merge(&dir.path().join("absent.fxtn")).unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
        assert!(session.scenes().is_empty());
    }
}
