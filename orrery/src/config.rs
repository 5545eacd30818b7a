//! Runtime settings with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scene::{MAX_TIME_SCALE, MIN_TIME_SCALE};

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "orrery.ron";

/// Errors that can occur when loading, saving, or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A setting parsed but holds a value the orrery cannot run with.
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Top-level orrery configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub animation: AnimationConfig,
    pub controls: ControlsConfig,
    /// Directory holding the body and star-field images.
    pub assets: PathBuf,
    /// `env_logger` filter, overridden by `RUST_LOG`.
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// sRGB ambient colour.
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    /// sRGB colour of the light at the sun's centre.
    pub point_color: [f32; 3],
    pub point_intensity: f32,
    /// Distance at which the point light reaches zero; 0 disables the cutoff.
    pub point_range: f32,
    pub point_decay: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Multiplier applied to every per-frame rotation increment.
    pub time_scale: f32,
    pub paused: bool,
    /// Seed for the initial orbital phases; random when unset.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Radians of orbit per pixel dragged.
    pub rotate_speed: f32,
    /// Fraction of the current distance zoomed per scroll line.
    pub zoom_speed: f32,
    /// Fraction of the current distance panned per pixel dragged.
    pub pan_speed: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            animation: AnimationConfig::default(),
            controls: ControlsConfig::default(),
            assets: PathBuf::from("assets/img"),
            log_level: "info,wgpu_core=warn,wgpu_hal=warn,naga=warn".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Orrery".to_string(),
            vsync: true,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 3000.0,
            position: [-200.0, 200.0, 200.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        // 0x333333
        let ambient = 0x33 as f32 / 255.0;
        Self {
            ambient_color: [ambient; 3],
            ambient_intensity: 1.0,
            point_color: [1.0, 1.0, 1.0],
            point_intensity: 2.0,
            point_range: 300.0,
            point_decay: 1.0,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            paused: false,
            seed: None,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.001,
        }
    }
}

impl Config {
    /// Parse a config from RON text. Missing fields take their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but would break the animation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.animation.time_scale;
        if !(MIN_TIME_SCALE..=MAX_TIME_SCALE).contains(&scale) {
            return Err(ConfigError::InvalidValue {
                field: "animation.time_scale",
                reason: format!("{scale} is outside {MIN_TIME_SCALE}..={MAX_TIME_SCALE}"),
            });
        }
        Ok(())
    }

    /// Serialize to pretty-printed RON.
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new()).map_err(ConfigError::SerializeError)
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    /// Load `explicit` if given, otherwise `default_path` if it exists, otherwise defaults.
    pub fn resolve(explicit: Option<&Path>, default_path: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if default_path.is_file() => Self::load(default_path),
            None => Ok(Self::default()),
        }
    }
}

/// Convert an sRGB colour component to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_scene_setup() {
        let config = Config::default();
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.camera.far, 3000.0);
        assert_eq!(config.camera.position, [-200.0, 200.0, 200.0]);
        assert_eq!(config.lighting.ambient_color, [0.2; 3]);
        assert_eq!(config.lighting.point_intensity, 2.0);
        assert_eq!(config.lighting.point_range, 300.0);
        assert_eq!(config.animation.time_scale, 1.0);
        assert!(config.animation.seed.is_none());
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config = Config::from_ron("(window: (width: 1920), animation: (seed: Some(7)))").unwrap();
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.animation.seed, Some(7));
        assert_eq!(config.lighting, LightingConfig::default());
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = Config::default();
        config.assets = PathBuf::from("/opt/orrery/img");
        config.controls.zoom_speed = 0.25;
        let text = config.to_ron().unwrap();
        assert_eq!(Config::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_ron_is_parse_error() {
        assert!(matches!(
            Config::from_ron("(window: (width: \"wide\"))"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("custom.ron");
        let fallback = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::File::create(&explicit)
            .unwrap()
            .write_all(b"(log_level: \"debug\")")
            .unwrap();
        std::fs::write(&fallback, "(log_level: \"warn\")").unwrap();

        assert_eq!(Config::resolve(Some(&explicit), &fallback).unwrap().log_level, "debug");
        assert_eq!(Config::resolve(None, &fallback).unwrap().log_level, "warn");
    }

    #[test]
    fn test_resolve_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ron");
        assert_eq!(Config::resolve(None, &missing).unwrap(), Config::default());
        assert!(matches!(
            Config::resolve(Some(&missing), &missing),
            Err(ConfigError::ReadError { .. })
        ));
    }

    #[test]
    fn test_rejects_unusable_time_scale() {
        for text in [
            "(animation: (time_scale: inf))",
            "(animation: (time_scale: NaN))",
            "(animation: (time_scale: -1.0))",
            "(animation: (time_scale: 0.0))",
            "(animation: (time_scale: 5000.0))",
        ] {
            assert!(
                matches!(
                    Config::from_ron(text),
                    Err(ConfigError::InvalidValue {
                        field: "animation.time_scale",
                        ..
                    })
                ),
                "{text} was accepted"
            );
        }
        assert_eq!(
            Config::from_ron("(animation: (time_scale: 0.5))").unwrap().animation.time_scale,
            0.5
        );
    }

    #[test]
    fn test_resolve_validates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "(animation: (time_scale: inf))").unwrap();
        assert!(matches!(
            Config::resolve(None, &path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_point_light_uses_linear_cutoff_falloff() {
        // Distance-limited falloff, so Pluto at 240 still gets some light
        let lighting = LightingConfig::default();
        assert_eq!(lighting.point_decay, 1.0);
        let attenuation = (1.0 - 240.0 / lighting.point_range).powf(lighting.point_decay);
        assert!(attenuation > 0.1);
    }

    #[test]
    fn test_srgb_to_linear() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.2) - 0.0331).abs() < 1e-3);
    }
}
