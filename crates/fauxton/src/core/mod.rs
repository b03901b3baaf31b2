//! Core crate settings

pub mod config;

pub use config::{ActionConfig, LampConfig, PropConfig, SessionConfig};
