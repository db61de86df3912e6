use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Perspective camera placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, -0.5, 5.0),
            target: Vec3::ZERO,
        }
    }
}

/// Pan/zoom controls. Rotation is never enabled on a card table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enabled: bool,
    /// Fraction of the pending motion applied per frame (0, 1].
    pub damping: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            damping: 0.05,
            zoom_speed: 0.1,
            min_distance: 1.0,
            max_distance: 50.0,
        }
    }
}

/// Configuration values for the window, camera and controls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Tabletop".into(),
            width: 1280,
            height: 720,
            vsync: true,
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Override the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Override the initial window size in logical pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable vertical sync.
    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| EngineError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|err| EngineError::Config(format!("{}: {err}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| EngineError::Config(err.to_string()))
    }

    /// Reject values the camera or controls cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::Config("window size must be non-zero".into()));
        }
        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(EngineError::Config(format!(
                "fov_degrees must be in (0, 180), got {}",
                camera.fov_degrees
            )));
        }
        if camera.near <= 0.0 || camera.far <= camera.near {
            return Err(EngineError::Config(format!(
                "clip planes must satisfy 0 < near < far, got {} and {}",
                camera.near, camera.far
            )));
        }
        let controls = &self.controls;
        if !(controls.damping > 0.0 && controls.damping <= 1.0) {
            return Err(EngineError::Config(format!(
                "damping must be in (0, 1], got {}",
                controls.damping
            )));
        }
        if controls.min_distance > controls.max_distance {
            return Err(EngineError::Config(
                "min_distance must not exceed max_distance".into(),
            ));
        }
        Ok(())
    }
}
