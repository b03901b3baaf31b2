//! # Fauxton
//!
//! Scenes of props, actions, and lamps that live in an external 3D authoring
//! session, addressed by stable logical names.
//!
//! The engine owns all object data and assigns identifiers from namespaces
//! shared by the whole session, renumbering them whenever they collide. A
//! [`Scene`] keeps its own logical names for its props and writes them to
//! project files in place of the engine's identifiers, so a scene can be
//! written and read back, into the same session or another one, without the
//! caller ever seeing a renumbered identifier.
//!
//! ## Features
//!
//! - **Scenes**: collection access by logical name, generated names for
//!   anonymous props
//! - **Resources**: pose, color, and animation accessors for props; keyframe
//!   channels for actions; optics and render metadata for lamps
//! - **Persistence**: single-scene project files written from a whole-session
//!   dump, with the session restored on every exit path
//! - **Engine Contract**: a [`SceneEngine`] trait plus an in-memory
//!   [`MemorySession`] implementing it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fauxton::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = MemorySession::new();
//!     let mut scene = Scene::new(&mut session);
//!
//!     let prop = Prop::new(&mut session);
//!     prop.set_position(&mut session, Vec3::new(0.0, 0.0, 1.0))?;
//!     scene.bind(&mut session, "hero", prop)?;
//!
//!     let key_light = Lamp::new(&mut session);
//!     scene.bind(&mut session, "key_light", key_light)?;
//!
//!     write_scene(&mut session, "studio.fxtn", &scene)?;
//!
//!     let mut other = MemorySession::new();
//!     let loaded = read_scene(&mut other, "studio.fxtn")?;
//!     let hero = loaded.lookup(&other, "hero")?;
//!     println!("hero at {:?}", hero.position(&other)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Entity and session configuration
pub mod core;
pub mod config;

pub mod foundation;
pub mod engine;
pub mod resource;
pub mod scene;

mod error;

pub use error::{SceneError, SceneResult};
pub use scene::{read_scene, read_scene_with, write_scene, Scene};

/// Common imports for scene users
pub mod prelude {
    pub use crate::{
        Scene, SceneError, SceneResult,
        read_scene, read_scene_with, write_scene,
        engine::{MemorySession, SceneEngine, Interpolation},
        resource::{Action, Lamp, Prop, Resource},
        foundation::math::{Keypoint, Pose, Quat, Vec3, Vec4},
        core::config::{ActionConfig, LampConfig, PropConfig, SessionConfig},
    };
}
