//! # Configuration
//!
//! Session-wide settings for the persistence protocol, and the explicit
//! construction-time configuration of each entity type. Every structure
//! loads from TOML or RON through the [`Config`] trait and is checked with
//! `validate()` before anything is created in the engine.
//!
//! ## Configuration Categories
//!
//! - **Session Config**: scene marker, scratch names, name generation
//! - **Prop Config**: initial pose, color, and animation of a prop
//! - **Lamp Config**: prop fields plus optical and render metadata
//! - **Action Config**: keypoints per channel

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};
use crate::engine::Interpolation;
use crate::foundation::math::{Vec3, quat_from_wxyz};

/// # Session Configuration
///
/// Controls how scenes are written to and read from project files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name the saved scene carries inside a project file
    ///
    /// Must sort before any other scene name the session may hold, since
    /// reading takes the first scene of the file.
    pub scene_marker: String,
    /// Prefix for temporary identifiers used while saving
    pub scratch_prefix: String,
    /// Attempts at drawing a free random logical name before giving up
    pub max_name_attempts: u32,
    /// Seed for logical-name generation; entropy when absent
    pub name_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scene_marker: "0".to_string(),
            scratch_prefix: "~fauxton".to_string(),
            max_name_attempts: 64,
            name_seed: None,
        }
    }
}

impl Config for SessionConfig {}

impl SessionConfig {
    /// Use a fixed seed for logical-name generation
    pub fn with_name_seed(mut self, seed: u64) -> Self {
        self.name_seed = Some(seed);
        self
    }

    /// Check every field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scene_marker.is_empty() {
            return Err(ConfigError::invalid("scene_marker", "must not be empty"));
        }
        if self.scratch_prefix.is_empty() {
            return Err(ConfigError::invalid("scratch_prefix", "must not be empty"));
        }
        // Scratch scene names are built from the prefix and must sort after the marker
        if self.scratch_prefix <= self.scene_marker {
            return Err(ConfigError::invalid(
                "scratch_prefix",
                format!("must sort after scene_marker '{}'", self.scene_marker),
            ));
        }
        if self.max_name_attempts == 0 {
            return Err(ConfigError::invalid("max_name_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

/// # Action Configuration
///
/// Keypoints per channel. Position and scale keypoints are `(t, x, y, z)`;
/// rotation keypoints are `(t, w, x, y, z)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Position keypoints
    pub position: Vec<[f32; 4]>,
    /// Rotation keypoints
    pub rotation: Vec<[f32; 5]>,
    /// Scale keypoints
    pub scale: Vec<[f32; 4]>,
    /// Interpolation used on the rotation curves
    pub rotation_interpolation: Interpolation,
}

impl Config for ActionConfig {}

impl ActionConfig {
    /// Check every keypoint is finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_keypoints("action.position", self.position.iter().map(|k| &k[..]))?;
        check_keypoints("action.rotation", self.rotation.iter().map(|k| &k[..]))?;
        check_keypoints("action.scale", self.scale.iter().map(|k| &k[..]))
    }
}

/// # Prop Configuration
///
/// Initial values applied right after the prop is created. Absent fields
/// keep the engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropConfig {
    /// Location
    pub position: Option<Vec3>,
    /// Rotation quaternion, `(w, x, y, z)`
    pub rotation: Option<[f32; 4]>,
    /// Scale
    pub scale: Option<Vec3>,
    /// Color, RGB or RGBA
    pub color: Option<Vec<f32>>,
    /// Animation to attach
    pub action: Option<ActionConfig>,
}

impl Config for PropConfig {}

impl PropConfig {
    /// Check every field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(position) = &self.position {
            check_finite("position", position.as_slice())?;
        }
        if let Some(rotation) = &self.rotation {
            check_finite("rotation", rotation)?;
            let norm = quat_from_wxyz(*rotation).norm();
            if norm == 0.0 {
                return Err(ConfigError::invalid("rotation", "quaternion has zero length"));
            }
            if !approx::relative_eq!(norm, 1.0, epsilon = 1e-3) {
                log::warn!("Prop rotation quaternion is not normalized (length {norm})");
            }
        }
        if let Some(scale) = &self.scale {
            check_finite("scale", scale.as_slice())?;
        }
        if let Some(color) = &self.color {
            if !(3..=4).contains(&color.len()) {
                return Err(ConfigError::invalid(
                    "color",
                    format!("expected 3 or 4 components, got {}", color.len()),
                ));
            }
            check_finite("color", color)?;
        }
        if let Some(action) = &self.action {
            action.validate()?;
        }
        Ok(())
    }
}

/// # Lamp Configuration
///
/// Prop fields plus the lamp's optical and render settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LampConfig {
    /// Fields shared with props
    #[serde(flatten)]
    pub prop: PropConfig,
    /// Viewing angles `(y, x)` in radians
    pub field_of_view: Option<[f32; 2]>,
    /// Image size `(y, x)` in pixels
    pub resolution: Option<[u32; 2]>,
    /// Shader source used as an emissive material
    pub source: Option<String>,
    /// Render pass to produce
    pub render_pass: Option<String>,
    /// Render engine to use
    pub render_engine: Option<String>,
}

impl Config for LampConfig {}

impl LampConfig {
    /// Check every field
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.prop.validate()?;
        if let Some(fov) = &self.field_of_view {
            check_finite("field_of_view", fov)?;
            if fov.iter().any(|&a| a <= 0.0 || a >= std::f32::consts::PI) {
                return Err(ConfigError::invalid("field_of_view", "angles must lie in (0, pi)"));
            }
        }
        if let Some(resolution) = &self.resolution {
            if resolution.contains(&0) {
                return Err(ConfigError::invalid("resolution", "must be at least 1x1"));
            }
        }
        for (field, value) in [("render_pass", &self.render_pass), ("render_engine", &self.render_engine)] {
            if value.as_deref().is_some_and(str::is_empty) {
                return Err(ConfigError::invalid(field, "must not be empty"));
            }
        }
        Ok(())
    }
}

fn check_finite(field: &'static str, values: &[f32]) -> Result<(), ConfigError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "contains a non-finite value"))
    }
}

fn check_keypoints<'a>(
    field: &'static str,
    keypoints: impl Iterator<Item = &'a [f32]>,
) -> Result<(), ConfigError> {
    for keypoint in keypoints {
        check_finite(field, keypoint)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_defaults_validate() {
        let config = SessionConfig::default();
        assert_eq!(config.scene_marker, "0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_rejects_zero_attempts() {
        let config = SessionConfig {
            max_name_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "max_name_attempts", .. })
        ));
    }

    #[test]
    fn test_session_rejects_prefix_sorting_before_marker() {
        let config = SessionConfig {
            scene_marker: "zz".to_string(),
            scratch_prefix: "tmp".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "scratch_prefix", .. })
        ));

        let config = SessionConfig {
            scene_marker: "zz".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prop_rejects_bad_color() {
        let config = PropConfig {
            color: Some(vec![1.0, 0.5]),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "color", .. })));
    }

    #[test]
    fn test_prop_rejects_zero_quaternion() {
        let config = PropConfig {
            rotation: Some([0.0; 4]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_action_rejects_nan_keypoint() {
        let config = ActionConfig {
            scale: vec![[0.0, 1.0, f32::NAN, 1.0]],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "action.scale", .. })
        ));
    }

    #[test]
    fn test_lamp_rejects_wide_field_of_view() {
        let config = LampConfig {
            field_of_view: Some([0.5, 4.0]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lamp_config_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lamp.toml");
        std::fs::write(
            &path,
            r#"
                position = [1.0, 2.0, 3.0]
                color = [1.0, 0.0, 0.0]
                resolution = [480, 640]
                render_engine = "CYCLES"
            "#,
        )
        .unwrap();

        let config = LampConfig::load_from_file(&path).unwrap();
        assert_eq!(config.prop.position, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(config.resolution, Some([480, 640]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_config_ron_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.ron");
        let config = SessionConfig::default().with_name_seed(7);
        config.save_to_file(&path).unwrap();
        assert_eq!(SessionConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        assert!(matches!(
            SessionConfig::load_from_file("session.yaml"),
            Err(ConfigError::Io(_) | ConfigError::UnsupportedFormat(_))
        ));
    }
}
