//! Native project-file format
//!
//! A project file is a 4-byte magic, a little-endian `u32` format version,
//! then a `bincode` encoded [`SessionDocument`]. Datablocks reference each
//! other by identifier, never by handle, so a file can be merged into any
//! session.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};

use super::data::{ActionData, AnimationData, LampData, ObjectData, ObjectKind, RotationMode};
use super::{ActionKey, EngineError, EngineResult};
use crate::foundation::math::{Vec3, Vec4, Quat};

/// Leading bytes of every project file
pub const FILE_MAGIC: [u8; 4] = *b"FXTN";

/// Current project-file format version
pub const FILE_VERSION: u32 = 1;

const HEADER_LEN: usize = FILE_MAGIC.len() + std::mem::size_of::<u32>();

/// Scene as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Scene name
    pub name: String,
    /// Current frame
    pub frame: f32,
    /// Member object identifiers, in link order
    pub members: Vec<String>,
}

/// Object as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Object identifier
    pub name: String,
    /// Object kind
    pub kind: ObjectKind,
    /// Location
    pub location: Vec3,
    /// Rotation mode in effect
    pub rotation_mode: RotationMode,
    /// Euler rotation
    pub rotation_euler: Vec3,
    /// Quaternion rotation
    pub rotation_quaternion: Quat,
    /// Scale
    pub scale: Vec3,
    /// Color
    pub color: Vec4,
    /// Whether the object has an animation slot
    pub animated: bool,
    /// Identifier of the attached action
    pub action: Option<String>,
    /// Lamp data
    pub lamp: Option<LampData>,
}

impl ObjectRecord {
    /// Capture an object's fields under `name`
    pub fn capture(name: &str, data: &ObjectData, action: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            kind: data.kind,
            location: data.location,
            rotation_mode: data.rotation_mode,
            rotation_euler: data.rotation_euler,
            rotation_quaternion: data.rotation_quaternion,
            scale: data.scale,
            color: data.color,
            animated: data.animation.is_some(),
            action,
            lamp: data.lamp.clone(),
        }
    }

    /// Rebuild object data, with the action already resolved to a handle
    pub fn restore(&self, action: Option<ActionKey>) -> ObjectData {
        let mut data = ObjectData::new(self.kind);
        data.location = self.location;
        data.rotation_mode = self.rotation_mode;
        data.rotation_euler = self.rotation_euler;
        data.rotation_quaternion = self.rotation_quaternion;
        data.scale = self.scale;
        data.color = self.color;
        data.lamp = self.lamp.clone();
        if self.animated || action.is_some() {
            data.animation = Some(AnimationData { action });
        }
        data
    }
}

/// Action as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Action identifier
    pub name: String,
    /// Curves
    pub data: ActionData,
}

/// Whole-session snapshot written to a project file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    /// Scenes, sorted by name
    pub scenes: Vec<SceneRecord>,
    /// Objects linked to at least one scene
    pub objects: Vec<ObjectRecord>,
    /// Actions used by at least one written object
    pub actions: Vec<ActionRecord>,
}

impl SessionDocument {
    /// Object record holding `name`
    pub fn object(&self, name: &str) -> Option<&ObjectRecord> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Action record holding `name`
    pub fn action(&self, name: &str) -> Option<&ActionRecord> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Encode to file bytes
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        let payload = bincode::serialize(self)?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&FILE_MAGIC);
        bytes.extend_from_slice(&FILE_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Write to `path`
    pub fn write(&self, path: &Path) -> EngineResult<()> {
        let bytes = self.encode().map_err(|e| EngineError::Format {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, bytes).map_err(|e| EngineError::io(path, e))
    }

    /// Read from `path`
    pub fn read(path: &Path) -> EngineResult<Self> {
        let bytes = fs::read(path).map_err(|e| EngineError::io(path, e))?;
        let invalid = |reason: String| EngineError::InvalidFile {
            path: path.to_path_buf(),
            reason,
        };

        if bytes.len() < HEADER_LEN || bytes[..FILE_MAGIC.len()] != FILE_MAGIC {
            return Err(invalid("missing project file header".to_string()));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[FILE_MAGIC.len()..HEADER_LEN]);
        let version = u32::from_le_bytes(version);
        if version != FILE_VERSION {
            return Err(invalid(format!("unsupported format version {version}")));
        }

        bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|e| EngineError::Format {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionDocument {
        let mut data = ObjectData::new(ObjectKind::Lamp);
        data.location = Vec3::new(1.0, 2.0, 3.0);
        SessionDocument {
            scenes: vec![SceneRecord {
                name: "0".to_string(),
                frame: 12.5,
                members: vec!["key".to_string()],
            }],
            objects: vec![ObjectRecord::capture("key", &data, None)],
            actions: Vec::new(),
        }
    }

    #[test]
    fn test_header_is_written() {
        let bytes = sample().encode().unwrap();
        assert_eq!(&bytes[..4], b"FXTN");
        assert_eq!(&bytes[4..8], &FILE_VERSION.to_le_bytes());
    }

    #[test]
    fn test_read_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"hello world").unwrap();

        let err = SessionDocument::read(&path).unwrap_err();
        assert!(matches!(err, EngineError::InvalidFile { .. }));
    }

    #[test]
    fn test_read_rejects_future_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.fxtn");
        let mut bytes = sample().encode().unwrap();
        bytes[4..8].copy_from_slice(&(FILE_VERSION + 1).to_le_bytes());
        fs::write(&path, bytes).unwrap();

        let err = SessionDocument::read(&path).unwrap_err();
        assert!(matches!(err, EngineError::InvalidFile { .. }));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.fxtn");
        let doc = sample();
        doc.write(&path).unwrap();
        assert_eq!(SessionDocument::read(&path).unwrap(), doc);
    }

    #[test]
    fn test_record_restore_keeps_rotation_mode() {
        let mut data = ObjectData::new(ObjectKind::Empty);
        data.set_rotation_mode(RotationMode::Quaternion);
        data.set_rotation_quaternion(Quat::new(0.0, 1.0, 0.0, 0.0));
        data.animation_data_create();

        let restored = ObjectRecord::capture("x", &data, None).restore(None);
        assert_eq!(restored, data);
    }
}
