//! Typed views over engine datablocks
//!
//! A resource is a copyable handle; its data lives in the engine session and
//! every accessor takes the engine explicitly. Handles outlive renames but
//! not deletion: once the engine drops the datablock, accessors fail with
//! [`SceneError::EngineState`](crate::SceneError::EngineState).

mod action;
mod lamp;
mod prop;

pub use action::{Action, LOCATION_PATH, ROTATION_PATH, SCALE_PATH};
pub use lamp::Lamp;
pub use prop::Prop;

use crate::engine::SceneEngine;
use crate::error::SceneResult;

/// A handle to one datablock in the engine store
pub trait Resource {
    /// Engine handle type
    type Key: Copy;

    /// Engine handle
    fn key(&self) -> Self::Key;

    /// Identifier the engine currently assigns to the datablock
    fn identifier<'e, E: SceneEngine + ?Sized>(&self, engine: &'e E) -> SceneResult<&'e str>;
}
