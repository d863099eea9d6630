//! Viewer configuration loaded from TOML
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::ProjectionMode;
use crate::scene::Material;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Drag and inertia tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Radians of rotation per pixel of drag
    pub sensitivity: f32,
    /// Per-frame multiplicative velocity decay while coasting
    pub friction: f32,
    /// Coasting stops once both velocity components fall below this
    pub rest_epsilon: f32,
    /// Optional cap on the total rotation (radians) of a single coast
    pub max_coast_angle: Option<f32>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.005,
            friction: 0.99,
            rest_epsilon: 1e-4,
            max_coast_angle: None,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sensitivity.is_finite() && self.sensitivity > 0.0) {
            return Err(ConfigError::Invalid {
                field: "sensitivity",
                reason: "must be a positive number",
            });
        }
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(ConfigError::Invalid {
                field: "friction",
                reason: "must lie strictly between 0 and 1",
            });
        }
        if !(self.rest_epsilon.is_finite() && self.rest_epsilon > 0.0) {
            return Err(ConfigError::Invalid {
                field: "rest_epsilon",
                reason: "must be a positive number",
            });
        }
        if let Some(max) = self.max_coast_angle {
            if !(max > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "max_coast_angle",
                    reason: "must be positive when set",
                });
            }
        }
        Ok(())
    }
}

/// Initial camera placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSettings {
    pub distance: f32,
    pub fov_degrees: f32,
    pub projection: ProjectionMode,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            distance: 5.0,
            fov_degrees: 45.0,
            projection: ProjectionMode::Perspective,
        }
    }
}

/// Model preparation applied after loading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSettings {
    /// Move the geometry so its bounds are centered on the pivot
    pub recenter: bool,
    /// Scale the geometry so its largest extent equals this size
    pub fit_size: Option<f32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            recenter: true,
            fit_size: Some(2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub interaction: ControllerConfig,
    pub camera: CameraSettings,
    pub model: ModelSettings,
    pub material: Material,
}

impl ViewerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interaction.validate()?;
        if !(self.camera.distance > 0.0) {
            return Err(ConfigError::Invalid {
                field: "camera.distance",
                reason: "must be positive",
            });
        }
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov_degrees",
                reason: "must lie strictly between 0 and 180",
            });
        }
        if let Some(size) = self.model.fit_size {
            if !(size > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "model.fit_size",
                    reason: "must be positive when set",
                });
            }
        }
        Ok(())
    }
}
