//! Datablock contents exposed by the engine
//!
//! These are the engine-visible fields of objects and actions. The typed
//! accessors in [`crate::resource`] are thin views over them.

use serde::{Serialize, Deserialize};

use crate::foundation::collections::ActionKey;
use crate::foundation::math::{Vec3, Vec4, Quat, quat_from_euler, quat_to_euler};

/// What kind of data an object carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Positionable object with no attached data
    Empty,
    /// Object carrying lamp data
    Lamp,
}

impl ObjectKind {
    /// Identifier the engine assigns when none is requested
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Empty => "Object",
            Self::Lamp => "Lamp",
        }
    }
}

/// How an object's rotation is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationMode {
    /// XYZ Euler angles, the engine default
    #[default]
    Euler,
    /// Quaternion, `w, x, y, z`
    Quaternion,
}

/// Keyframe interpolation to the next point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interpolation {
    /// Hold the value until the next keyframe
    Constant,
    /// Straight line to the next keyframe
    #[default]
    Linear,
    /// Smooth curve to the next keyframe
    Bezier,
}

/// Per-object animation slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationData {
    /// Action currently driving the object
    pub action: Option<ActionKey>,
}

/// Lamp-specific optical and rendering metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LampData {
    /// Emission color (RGBA)
    pub color: Vec4,
    /// Shader source used as an emissive material when rendering
    pub source: Option<String>,
    /// Viewing angles `(y, x)` in radians
    pub field_of_view: [f32; 2],
    /// Image size `(y, x)` in pixels
    pub resolution: [u32; 2],
    /// Render pass to produce (e.g. "z" or "color")
    pub render_pass: String,
    /// Render engine to use (e.g. "CYCLES")
    pub render_engine: String,
}

impl Default for LampData {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            source: None,
            field_of_view: [std::f32::consts::FRAC_PI_4, std::f32::consts::FRAC_PI_4],
            resolution: [256, 256],
            render_pass: "combined".to_string(),
            render_engine: "CYCLES".to_string(),
        }
    }
}

/// Engine-visible fields of an object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectData {
    /// Object kind, fixed at creation
    pub kind: ObjectKind,
    /// Location in 3D space
    pub location: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
    /// Object color (RGBA)
    pub color: Vec4,
    /// Animation slot; absent until first requested
    pub animation: Option<AnimationData>,
    /// Lamp data for [`ObjectKind::Lamp`] objects
    pub lamp: Option<LampData>,
    pub(crate) rotation_mode: RotationMode,
    pub(crate) rotation_euler: Vec3,
    pub(crate) rotation_quaternion: Quat,
}

impl ObjectData {
    /// Fresh object data as the engine creates it
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            location: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            animation: None,
            lamp: (kind == ObjectKind::Lamp).then(LampData::default),
            rotation_mode: RotationMode::Euler,
            rotation_euler: Vec3::zeros(),
            rotation_quaternion: Quat::identity(),
        }
    }

    /// Current rotation mode
    pub fn rotation_mode(&self) -> RotationMode {
        self.rotation_mode
    }

    /// Switch rotation mode, converting the stored rotation
    pub fn set_rotation_mode(&mut self, mode: RotationMode) {
        if mode == self.rotation_mode {
            return;
        }
        match mode {
            RotationMode::Quaternion => {
                self.rotation_quaternion = quat_from_euler(&self.rotation_euler);
            }
            RotationMode::Euler => {
                self.rotation_euler = quat_to_euler(&self.rotation_quaternion);
            }
        }
        self.rotation_mode = mode;
    }

    /// Stored quaternion; only meaningful in quaternion mode
    pub fn rotation_quaternion(&self) -> Quat {
        self.rotation_quaternion
    }

    /// Store a quaternion; only takes effect in quaternion mode
    pub fn set_rotation_quaternion(&mut self, rotation: Quat) {
        self.rotation_quaternion = rotation;
    }

    /// Stored Euler angles; only meaningful in Euler mode
    pub fn rotation_euler(&self) -> Vec3 {
        self.rotation_euler
    }

    /// Store Euler angles; only takes effect in Euler mode
    pub fn set_rotation_euler(&mut self, rotation: Vec3) {
        self.rotation_euler = rotation;
    }

    /// Action currently attached, if any
    pub fn action(&self) -> Option<ActionKey> {
        self.animation.as_ref().and_then(|anim| anim.action)
    }

    /// Animation slot, created on first use
    pub fn animation_data_create(&mut self) -> &mut AnimationData {
        self.animation.get_or_insert_with(AnimationData::default)
    }
}

/// One keyframe on an animation curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyframePoint {
    /// Frame the key sits at
    pub frame: f32,
    /// Channel value at that frame
    pub value: f32,
    /// Interpolation towards the next key
    pub interpolation: Interpolation,
}

/// Animation curve for one component of one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    /// Animated property, e.g. `location`
    pub data_path: String,
    /// Component of the property the curve drives
    pub array_index: usize,
    /// Keyframes in insertion order
    pub keyframe_points: Vec<KeyframePoint>,
}

impl FCurve {
    /// Append a keyframe
    pub fn insert(&mut self, frame: f32, value: f32, interpolation: Interpolation) {
        self.keyframe_points.push(KeyframePoint { frame, value, interpolation });
    }
}

/// Engine-visible fields of an action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionData {
    fcurves: Vec<FCurve>,
}

impl ActionData {
    /// All curves of the action
    pub fn fcurves(&self) -> &[FCurve] {
        &self.fcurves
    }

    /// Create a curve for `data_path[array_index]`, replacing any existing one
    pub fn new_fcurve(&mut self, data_path: &str, array_index: usize) -> &mut FCurve {
        self.fcurves
            .retain(|c| !(c.data_path == data_path && c.array_index == array_index));
        self.fcurves.push(FCurve {
            data_path: data_path.to_string(),
            array_index,
            keyframe_points: Vec::new(),
        });
        let last = self.fcurves.len() - 1;
        &mut self.fcurves[last]
    }

    /// Remove every curve on `data_path`
    pub fn remove_fcurves(&mut self, data_path: &str) {
        self.fcurves.retain(|c| c.data_path != data_path);
    }

    /// Curve for `data_path[array_index]`, if any
    pub fn find_fcurve(&self, data_path: &str, array_index: usize) -> Option<&FCurve> {
        self.fcurves
            .iter()
            .find(|c| c.data_path == data_path && c.array_index == array_index)
    }
}
