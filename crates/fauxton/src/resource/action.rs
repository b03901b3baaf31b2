//! Keyframed animations

use super::Resource;
use crate::core::config::ActionConfig;
use crate::engine::{ActionData, ActionKey, Interpolation, SceneEngine};
use crate::error::SceneResult;
use crate::foundation::math::{Keypoint, Quat, Vec3, quat_from_wxyz, quat_to_wxyz};

/// Data path animated by position curves
pub const LOCATION_PATH: &str = "location";

/// Data path animated by rotation curves
pub const ROTATION_PATH: &str = "rotation_quaternion";

/// Data path animated by scale curves
pub const SCALE_PATH: &str = "scale";

/// A keyframe-based animation that can be applied to a [`Prop`](super::Prop)
///
/// Each channel setter replaces the channel outright: all curves on the
/// channel's data path are removed, then one curve per component is created
/// with one keyframe per keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    key: ActionKey,
}

impl Action {
    /// Create an empty action
    pub fn new<E: SceneEngine + ?Sized>(engine: &mut E) -> Self {
        Self { key: engine.create_action() }
    }

    /// Create an action and fill its channels from `config`, which is validated first
    pub fn with_config<E: SceneEngine + ?Sized>(engine: &mut E, config: &ActionConfig) -> SceneResult<Self> {
        config.validate()?;
        let action = Self::new(engine);
        let data = engine.action_mut(action.key)?;
        if !config.position.is_empty() {
            write_channel(data, LOCATION_PATH, config.position.iter().map(split::<4, 3>), Interpolation::Linear);
        }
        if !config.rotation.is_empty() {
            write_channel(data, ROTATION_PATH, config.rotation.iter().map(split::<5, 4>), config.rotation_interpolation);
        }
        if !config.scale.is_empty() {
            write_channel(data, SCALE_PATH, config.scale.iter().map(split::<4, 3>), Interpolation::Linear);
        }
        Ok(action)
    }

    /// Wrap an existing action handle
    pub fn from_key(key: ActionKey) -> Self {
        Self { key }
    }

    /// Position keypoints
    pub fn position<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<Vec<Keypoint<Vec3>>> {
        let data = engine.action(self.key)?;
        Ok(read_channel::<3>(data, LOCATION_PATH)
            .into_iter()
            .map(|(frame, v)| Keypoint::new(frame, Vec3::new(v[0], v[1], v[2])))
            .collect())
    }

    /// Replace the position channel, linear interpolation
    pub fn set_position<E: SceneEngine + ?Sized>(&self, engine: &mut E, keypoints: &[Keypoint<Vec3>]) -> SceneResult<()> {
        let data = engine.action_mut(self.key)?;
        write_channel(
            data,
            LOCATION_PATH,
            keypoints.iter().map(|k| (k.frame, [k.value.x, k.value.y, k.value.z])),
            Interpolation::Linear,
        );
        Ok(())
    }

    /// Rotation keypoints
    pub fn rotation<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<Vec<Keypoint<Quat>>> {
        let data = engine.action(self.key)?;
        Ok(read_channel::<4>(data, ROTATION_PATH)
            .into_iter()
            .map(|(frame, v)| Keypoint::new(frame, quat_from_wxyz(v)))
            .collect())
    }

    /// Replace the rotation channel, linear interpolation
    pub fn set_rotation<E: SceneEngine + ?Sized>(&self, engine: &mut E, keypoints: &[Keypoint<Quat>]) -> SceneResult<()> {
        self.set_rotation_with(engine, keypoints, Interpolation::Linear)
    }

    /// Replace the rotation channel with the given interpolation
    pub fn set_rotation_with<E: SceneEngine + ?Sized>(
        &self,
        engine: &mut E,
        keypoints: &[Keypoint<Quat>],
        interpolation: Interpolation,
    ) -> SceneResult<()> {
        let data = engine.action_mut(self.key)?;
        write_channel(
            data,
            ROTATION_PATH,
            keypoints.iter().map(|k| (k.frame, quat_to_wxyz(&k.value))),
            interpolation,
        );
        Ok(())
    }

    /// Scale keypoints
    pub fn scale<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<Vec<Keypoint<Vec3>>> {
        let data = engine.action(self.key)?;
        Ok(read_channel::<3>(data, SCALE_PATH)
            .into_iter()
            .map(|(frame, v)| Keypoint::new(frame, Vec3::new(v[0], v[1], v[2])))
            .collect())
    }

    /// Replace the scale channel, linear interpolation
    pub fn set_scale<E: SceneEngine + ?Sized>(&self, engine: &mut E, keypoints: &[Keypoint<Vec3>]) -> SceneResult<()> {
        let data = engine.action_mut(self.key)?;
        write_channel(
            data,
            SCALE_PATH,
            keypoints.iter().map(|k| (k.frame, [k.value.x, k.value.y, k.value.z])),
            Interpolation::Linear,
        );
        Ok(())
    }
}

impl Resource for Action {
    type Key = ActionKey;

    fn key(&self) -> ActionKey {
        self.key
    }

    fn identifier<'e, E: SceneEngine + ?Sized>(&self, engine: &'e E) -> SceneResult<&'e str> {
        Ok(engine.action_identifier(self.key)?)
    }
}

/// Split a flat `(t, c0, c1, ...)` keypoint into frame and components
fn split<const M: usize, const N: usize>(keypoint: &[f32; M]) -> (f32, [f32; N]) {
    let mut values = [0.0; N];
    values.copy_from_slice(&keypoint[1..]);
    (keypoint[0], values)
}

fn write_channel<const N: usize>(
    data: &mut ActionData,
    path: &str,
    keypoints: impl Iterator<Item = (f32, [f32; N])>,
    interpolation: Interpolation,
) {
    let keypoints: Vec<_> = keypoints.collect();
    data.remove_fcurves(path);
    for index in 0..N {
        let curve = data.new_fcurve(path, index);
        for (frame, values) in &keypoints {
            curve.insert(*frame, values[index], interpolation);
        }
    }
}

/// Keypoints of a channel; empty unless every component curve exists
fn read_channel<const N: usize>(data: &ActionData, path: &str) -> Vec<(f32, [f32; N])> {
    let curves: Option<Vec<_>> = (0..N).map(|index| data.find_fcurve(path, index)).collect();
    let Some(curves) = curves else {
        return Vec::new();
    };
    let count = curves.iter().map(|c| c.keyframe_points.len()).min().unwrap_or(0);

    (0..count)
        .map(|j| {
            let mut values = [0.0; N];
            for (value, curve) in values.iter_mut().zip(&curves) {
                *value = curve.keyframe_points[j].value;
            }
            (curves[0].keyframe_points[j].frame, values)
        })
        .collect()
}
