//! Scene-level errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;

/// Errors surfaced by scene, registry, and resource operations
#[derive(Error, Debug)]
pub enum SceneError {
    /// Logical name or resource is not registered in the scene
    #[error("Not found in scene: {0}")]
    NotFound(String),

    /// Random name generation could not find a free logical name
    #[error("No free logical name after {attempts} attempts")]
    CollisionExhausted {
        /// Number of names tried
        attempts: u32,
    },

    /// Project file could not be read or written
    #[error("Persistence error: {0}")]
    PersistenceIo(#[source] EngineError),

    /// Logical name cannot be stored as an engine identifier
    #[error("Invalid logical name '{name}': {reason}")]
    InvalidName {
        /// Rejected name
        name: String,
        /// Why the name was rejected
        reason: String,
    },

    /// Engine no longer holds a datablock the scene refers to
    #[error("Engine state error: {0}")]
    EngineState(String),

    /// Resource is not of the expected kind
    #[error("Kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        /// Kind the caller asked for
        expected: &'static str,
        /// Kind the resource actually has
        found: &'static str,
    },

    /// Entity configuration was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<EngineError> for SceneError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::StaleHandle { .. } => Self::EngineState(err.to_string()),
            EngineError::Io { .. } | EngineError::Format { .. } | EngineError::InvalidFile { .. } => {
                Self::PersistenceIo(err)
            }
        }
    }
}

/// Scene result type
pub type SceneResult<T> = Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_are_classified() {
        let stale: SceneError = EngineError::StaleHandle { kind: "object" }.into();
        assert!(matches!(stale, SceneError::EngineState(_)));

        let io = EngineError::Io {
            path: "x.fxtn".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(matches!(SceneError::from(io), SceneError::PersistenceIo(_)));
    }
}
