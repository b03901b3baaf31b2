//! Scene-level tests spanning the registry, resources, and persistence


use crate::engine::{MemorySession, ObjectData, ObjectKey, SceneEngine, SceneKey};

/// Everything observable about a session, keyed by handle
#[derive(Debug, PartialEq)]
pub(super) struct Snapshot {
    objects: Vec<(ObjectKey, String, ObjectData)>,
    scenes: Vec<(SceneKey, String, f32, Vec<ObjectKey>)>,
}

pub(super) fn snapshot(session: &MemorySession) -> Snapshot {
    let objects = session
        .objects()
        .into_iter()
        .map(|key| {
            (
                key,
                session.object_identifier(key).unwrap().to_string(),
                session.object(key).unwrap().clone(),
            )
        })
        .collect();
    let scenes = session
        .scenes()
        .into_iter()
        .map(|key| {
            (
                key,
                session.scene_name(key).unwrap().to_string(),
                session.frame(key).unwrap(),
                session.members(key).unwrap().to_vec(),
            )
        })
        .collect();
    Snapshot { objects, scenes }
}
