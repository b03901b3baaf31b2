//! Positionable, posable objects

use super::{Action, Resource};
use crate::core::config::PropConfig;
use crate::engine::{ObjectData, ObjectKey, ObjectKind, RotationMode, SceneEngine};
use crate::error::SceneResult;
use crate::foundation::math::{Pose, Quat, Vec3, Vec4, quat_from_wxyz};

/// A graphical object that can be added to a [`Scene`](crate::Scene)
///
/// Rotation is always exchanged as a `w, x, y, z` quaternion. Every rotation
/// access switches the object to quaternion mode first, so a prop created
/// in Euler mode reads back its converted rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prop {
    key: ObjectKey,
}

impl Prop {
    /// Create an empty prop with default pose
    pub fn new<E: SceneEngine + ?Sized>(engine: &mut E) -> Self {
        Self { key: engine.create_object(ObjectKind::Empty) }
    }

    /// Create a prop and apply `config`, which is validated first
    pub fn with_config<E: SceneEngine + ?Sized>(engine: &mut E, config: &PropConfig) -> SceneResult<Self> {
        config.validate()?;
        let prop = Self::new(engine);
        prop.apply_config(engine, config)?;
        Ok(prop)
    }

    /// Wrap an existing object handle
    pub fn from_key(key: ObjectKey) -> Self {
        Self { key }
    }

    /// Kind of object behind the handle
    pub fn kind<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<ObjectKind> {
        Ok(engine.object(self.key)?.kind)
    }

    pub(crate) fn apply_config<E: SceneEngine + ?Sized>(&self, engine: &mut E, config: &PropConfig) -> SceneResult<()> {
        if let Some(position) = config.position {
            self.set_position(engine, position)?;
        }
        if let Some(rotation) = config.rotation {
            self.set_rotation(engine, quat_from_wxyz(rotation))?;
        }
        if let Some(scale) = config.scale {
            self.set_scale(engine, scale)?;
        }
        if let Some(color) = &config.color {
            let alpha = color.get(3).copied().unwrap_or(1.0);
            self.set_color(engine, Vec4::new(color[0], color[1], color[2], alpha))?;
        }
        if let Some(action) = &config.action {
            let action = Action::with_config(engine, action)?;
            self.set_action(engine, &action)?;
        }
        Ok(())
    }

    fn data<'e, E: SceneEngine + ?Sized>(&self, engine: &'e E) -> SceneResult<&'e ObjectData> {
        Ok(engine.object(self.key)?)
    }

    fn data_mut<'e, E: SceneEngine + ?Sized>(&self, engine: &'e mut E) -> SceneResult<&'e mut ObjectData> {
        Ok(engine.object_mut(self.key)?)
    }

    /// Quaternion-mode object data
    fn quaternion_data<'e, E: SceneEngine + ?Sized>(&self, engine: &'e mut E) -> SceneResult<&'e mut ObjectData> {
        let data = self.data_mut(engine)?;
        data.set_rotation_mode(RotationMode::Quaternion);
        Ok(data)
    }

    /// Location in 3D space
    pub fn position<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<Vec3> {
        Ok(self.data(engine)?.location)
    }

    /// Move the prop
    pub fn set_position<E: SceneEngine + ?Sized>(&self, engine: &mut E, position: Vec3) -> SceneResult<()> {
        self.data_mut(engine)?.location = position;
        Ok(())
    }

    /// Rotation quaternion
    pub fn rotation<E: SceneEngine + ?Sized>(&self, engine: &mut E) -> SceneResult<Quat> {
        Ok(self.quaternion_data(engine)?.rotation_quaternion())
    }

    /// Set the rotation quaternion
    pub fn set_rotation<E: SceneEngine + ?Sized>(&self, engine: &mut E, rotation: Quat) -> SceneResult<()> {
        self.quaternion_data(engine)?.set_rotation_quaternion(rotation);
        Ok(())
    }

    /// Per-axis scale
    pub fn scale<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<Vec3> {
        Ok(self.data(engine)?.scale)
    }

    /// Set the per-axis scale
    pub fn set_scale<E: SceneEngine + ?Sized>(&self, engine: &mut E, scale: Vec3) -> SceneResult<()> {
        self.data_mut(engine)?.scale = scale;
        Ok(())
    }

    /// Object color (RGBA)
    pub fn color<E: SceneEngine + ?Sized>(&self, engine: &E) -> SceneResult<Vec4> {
        Ok(self.data(engine)?.color)
    }

    /// Set the object color
    pub fn set_color<E: SceneEngine + ?Sized>(&self, engine: &mut E, color: Vec4) -> SceneResult<()> {
        self.data_mut(engine)?.color = color;
        Ok(())
    }

    /// Position, rotation, and scale together
    pub fn pose<E: SceneEngine + ?Sized>(&self, engine: &mut E) -> SceneResult<Pose> {
        let data = self.quaternion_data(engine)?;
        Ok(Pose::new(data.location, data.rotation_quaternion(), data.scale))
    }

    /// Set position, rotation, and scale together
    pub fn set_pose<E: SceneEngine + ?Sized>(&self, engine: &mut E, pose: &Pose) -> SceneResult<()> {
        let data = self.quaternion_data(engine)?;
        data.location = pose.position;
        data.set_rotation_quaternion(pose.rotation);
        data.scale = pose.scale;
        Ok(())
    }

    /// Action currently being performed
    pub fn action<E: SceneEngine + ?Sized>(&self, engine: &mut E) -> SceneResult<Option<Action>> {
        Ok(self.quaternion_data(engine)?.action().map(Action::from_key))
    }

    /// Attach an action, creating the animation slot if needed
    pub fn set_action<E: SceneEngine + ?Sized>(&self, engine: &mut E, action: &Action) -> SceneResult<()> {
        engine.action(action.key())?;
        let data = self.quaternion_data(engine)?;
        data.animation_data_create().action = Some(action.key());
        Ok(())
    }

    /// Detach the current action, keeping the animation slot
    pub fn clear_action<E: SceneEngine + ?Sized>(&self, engine: &mut E) -> SceneResult<()> {
        if let Some(animation) = self.data_mut(engine)?.animation.as_mut() {
            animation.action = None;
        }
        Ok(())
    }
}

impl Resource for Prop {
    type Key = ObjectKey;

    fn key(&self) -> ObjectKey {
        self.key
    }

    fn identifier<'e, E: SceneEngine + ?Sized>(&self, engine: &'e E) -> SceneResult<&'e str> {
        Ok(engine.object_identifier(self.key)?)
    }
}
