//! Scenes and their persistence
//!
//! A [`Scene`] owns a [`SceneRegistry`] that maps logical names chosen by
//! the caller to the identifiers the engine assigns. Logical names are what
//! gets written to project files, so they survive the engine renumbering
//! objects on every read and write.

mod persistence;
mod registry;
#[allow(clippy::module_inception)]
mod scene;

pub use persistence::{read_scene, read_scene_with, write_scene};
pub use registry::{SceneRegistry, NAME_SPACE};
pub use scene::Scene;

#[cfg(test)]
mod tests;
