//! Capture and session configuration.
//!
//! Preview dimensions must be even because chroma is subsampled 2:1 in
//! both axes. The display orientation is applied to the device once it
//! has been acquired.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the capture device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device index or identifier.
    pub device_id: u32,
    /// Preview width in pixels.
    pub width: u32,
    /// Preview height in pixels.
    pub height: u32,
    /// Target frames per second.
    pub fps: u32,
    /// Rotation applied to the preview display, in degrees.
    pub display_orientation: u16,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 640,
            height: 480,
            fps: 30,
            display_orientation: 270,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if !matches!(self.display_orientation, 0 | 90 | 180 | 270) {
            return Err(ConfigError::InvalidOrientation(self.display_orientation));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Zero or odd frame dimensions.
    #[error("invalid frame dimensions {width}x{height} (must be positive and even)")]
    InvalidDimensions {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// Frame rate outside 1-120.
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    /// Orientation that is not a right angle.
    #[error("invalid display orientation {0} (must be 0, 90, 180 or 270)")]
    InvalidOrientation(u16),
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[capture]` table.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// `[session]` table.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Settings for a demo capture session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long the session keeps the device open.
    pub duration_ms: u64,
    /// Delay between device open and arming.
    pub arm_delay_ms: u64,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 3000,
            arm_delay_ms: 0,
            metrics_port: 9090,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.capture.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_odd_dimensions_invalid() {
        let config = CaptureConfig::with_dimensions(641, 480);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_orientation_must_be_right_angle() {
        let config = CaptureConfig {
            display_orientation: 45,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOrientation(45))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = FileConfig::from_toml(
            r#"
            [capture]
            width = 320
            height = 240

            [session]
            duration_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.capture.width, 320);
        assert_eq!(config.capture.fps, 30);
        assert_eq!(config.capture.display_orientation, 270);
        assert_eq!(config.session.duration_ms, 500);
        assert_eq!(config.session.metrics_port, 9090);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = FileConfig::from_toml("[capture]\nwidth = 3\nheight = 3\n");
        assert!(matches!(result, Err(ConfigError::InvalidDimensions { .. })));

        let result = FileConfig::from_toml("not = [valid");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
