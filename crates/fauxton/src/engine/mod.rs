//! External 3D-authoring engine
//!
//! The scene registry never owns object data. Everything lives in an engine
//! session whose identifiers are global across all loaded scenes and may be
//! renamed by the engine at any time. [`SceneEngine`] is the capability
//! contract the rest of the crate relies on; [`MemorySession`] is an
//! in-process implementation with the same namespace and persistence rules.
//!
//! ## Contract
//!
//! - Handles (`ObjectKey`, `ActionKey`, `SceneKey`) stay valid across renames
//!   and are invalidated only by deletion.
//! - Identifiers are unique per datablock family for the whole session.
//!   Creating, renaming, or merging into a taken identifier never fails; the
//!   engine picks the next free `stem.NNN` variant and reports it.
//! - [`SceneEngine::save_session`] writes everything the session holds, not
//!   one scene. Objects linked to no scene are not written.
//! - [`SceneEngine::load_merge`] imports the first scene of a file and its
//!   members into the running session.

mod data;
mod file;
mod memory;
pub mod namespace;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use crate::foundation::collections::{ActionKey, ObjectKey, SceneKey};
pub use data::{
    ActionData, AnimationData, FCurve, Interpolation, KeyframePoint, LampData,
    ObjectData, ObjectKind, RotationMode,
};
pub use file::{SessionDocument, FILE_MAGIC, FILE_VERSION};
pub use memory::MemorySession;

/// Errors raised by the engine itself
#[derive(Error, Debug)]
pub enum EngineError {
    /// Handle refers to a datablock that no longer exists
    #[error("Stale {kind} handle: datablock was deleted")]
    StaleHandle {
        /// Datablock family of the handle
        kind: &'static str,
    },

    /// Reading or writing a project file failed
    #[error("IO error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Project file could not be encoded or decoded
    #[error("Project file encoding error on {path}: {message}")]
    Format {
        /// File being accessed
        path: PathBuf,
        /// Codec message
        message: String,
    },

    /// File is not a project file, or has no scene to load
    #[error("Invalid project file {path}: {reason}")]
    InvalidFile {
        /// File being accessed
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },
}

impl EngineError {
    pub(crate) fn stale(kind: &'static str) -> Self {
        Self::StaleHandle { kind }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Engine result type
pub type EngineResult<T> = Result<T, EngineError>;

/// One object imported by [`SceneEngine::load_merge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedObject {
    /// Identifier the object had inside the file
    pub stored_identifier: String,
    /// Handle of the object in the running session
    pub key: ObjectKey,
    /// Identifier assigned in the running session
    pub identifier: String,
}

/// Outcome of a merge-load
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// The imported scene
    pub scene: SceneKey,
    /// Imported scene members, in the order the file lists them
    pub objects: Vec<MergedObject>,
}

/// Capability contract of the external engine
pub trait SceneEngine {
    // --- Factories ---

    /// Create an object with an engine-chosen identifier
    fn create_object(&mut self, kind: ObjectKind) -> ObjectKey;

    /// Create an empty action with an engine-chosen identifier
    fn create_action(&mut self) -> ActionKey;

    /// Create an empty scene with an engine-chosen name
    fn create_scene(&mut self) -> SceneKey;

    /// Delete an object, unlinking it from every scene
    fn delete_object(&mut self, key: ObjectKey) -> EngineResult<()>;

    // --- Objects ---

    /// Every object in the session
    fn objects(&self) -> Vec<ObjectKey>;

    /// Current identifier of an object
    fn object_identifier(&self, key: ObjectKey) -> EngineResult<&str>;

    /// Rename an object, returning the identifier actually assigned
    fn rename_object(&mut self, key: ObjectKey, name: &str) -> EngineResult<String>;

    /// Object currently holding `identifier`
    fn find_object(&self, identifier: &str) -> Option<ObjectKey>;

    /// Engine-visible fields of an object
    fn object(&self, key: ObjectKey) -> EngineResult<&ObjectData>;

    /// Mutable engine-visible fields of an object
    fn object_mut(&mut self, key: ObjectKey) -> EngineResult<&mut ObjectData>;

    // --- Actions ---

    /// Current identifier of an action
    fn action_identifier(&self, key: ActionKey) -> EngineResult<&str>;

    /// Curves of an action
    fn action(&self, key: ActionKey) -> EngineResult<&ActionData>;

    /// Mutable curves of an action
    fn action_mut(&mut self, key: ActionKey) -> EngineResult<&mut ActionData>;

    // --- Scenes ---

    /// Every scene in the session, in creation order
    fn scenes(&self) -> Vec<SceneKey>;

    /// Current name of a scene
    fn scene_name(&self, key: SceneKey) -> EngineResult<&str>;

    /// Rename a scene, returning the name actually assigned
    fn rename_scene(&mut self, key: SceneKey, name: &str) -> EngineResult<String>;

    /// Scene currently holding `name`
    fn find_scene(&self, name: &str) -> Option<SceneKey>;

    /// Add an object to a scene's members; linking a member again is a no-op
    fn link(&mut self, scene: SceneKey, object: ObjectKey) -> EngineResult<()>;

    /// Remove an object from a scene's members; unlinking a non-member is a no-op
    fn unlink(&mut self, scene: SceneKey, object: ObjectKey) -> EngineResult<()>;

    /// Members of a scene in link order
    fn members(&self, scene: SceneKey) -> EngineResult<&[ObjectKey]>;

    /// Current frame of a scene
    fn frame(&self, scene: SceneKey) -> EngineResult<f32>;

    /// Set the current frame of a scene
    fn set_frame(&mut self, scene: SceneKey, frame: f32) -> EngineResult<()>;

    // --- Persistence ---

    /// Import the first scene of a project file and its members
    fn load_merge(&mut self, path: &Path) -> EngineResult<MergeReport>;

    /// Write the whole session to a project file
    fn save_session(&self, path: &Path) -> EngineResult<()>;
}
