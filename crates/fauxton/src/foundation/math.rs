//! Math utilities and types
//!
//! Provides the vector and quaternion types used for prop poses and
//! animation keypoints.

pub use nalgebra::{
    Vector3, Vector4,
    Quaternion,
    UnitQuaternion,
};
use serde::{Serialize, Deserialize};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (RGBA colors)
pub type Vec4 = Vector4<f32>;

/// Raw rotation quaternion
///
/// Kept non-normalized: the engine stores whatever four components it is
/// given, so reading back must return them unchanged.
pub type Quat = Quaternion<f32>;

/// Build a quaternion from components in `w, x, y, z` order
pub fn quat_from_wxyz(wxyz: [f32; 4]) -> Quat {
    Quat::new(wxyz[0], wxyz[1], wxyz[2], wxyz[3])
}

/// Components of a quaternion in `w, x, y, z` order
pub fn quat_to_wxyz(q: &Quat) -> [f32; 4] {
    [q.w, q.i, q.j, q.k]
}

/// Convert XYZ Euler angles (radians) to a rotation quaternion
pub fn quat_from_euler(euler: &Vec3) -> Quat {
    UnitQuaternion::from_euler_angles(euler.x, euler.y, euler.z).into_inner()
}

/// Convert a rotation quaternion to XYZ Euler angles (radians)
pub fn quat_to_euler(q: &Quat) -> Vec3 {
    let (roll, pitch, yaw) = UnitQuaternion::from_quaternion(*q).euler_angles();
    Vec3::new(roll, pitch, yaw)
}

/// Position, rotation, and scale of a prop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Location in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale, one component per object-space axis
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Pose {
    /// Create a pose from its three parts
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Create a pose with only a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// A single animation keypoint: a value at a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint<T> {
    /// Frame the value applies at
    pub frame: f32,

    /// Value at that frame
    pub value: T,
}

impl<T> Keypoint<T> {
    /// Create a keypoint
    pub fn new(frame: f32, value: T) -> Self {
        Self { frame, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wxyz_order() {
        let q = quat_from_wxyz([0.5, 0.1, 0.2, 0.3]);
        assert_eq!(q.w, 0.5);
        assert_eq!(q.i, 0.1);
        assert_eq!(quat_to_wxyz(&q), [0.5, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_euler_roundtrip() {
        let euler = Vec3::new(0.3, -0.2, 1.1);
        let q = quat_from_euler(&euler);
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(quat_to_euler(&q), euler, epsilon = 1e-5);
    }

    #[test]
    fn test_default_pose_is_identity() {
        let pose = Pose::default();
        assert_eq!(pose.position, Vec3::zeros());
        assert_eq!(pose.rotation, Quat::identity());
        assert_eq!(pose.scale, Vec3::new(1.0, 1.0, 1.0));
    }
}
