//! Pipeline configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::toggles::FrameConfig;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A rectangle in processed-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

impl Default for Roi {
    fn default() -> Self {
        Self::new(368, 505, 100, 100)
    }
}

/// Clockwise rotation applied after resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

/// Render target size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(750, 1334)
    }
}

/// Configuration for [`RealtimeDepthPipeline`](crate::RealtimeDepthPipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Region whose mean intensity feeds the rolling average.
    pub roi: Roi,
    /// Frames per rolling-average window.
    pub window_size: u32,
    /// Alert when a window's average exceeds this, on a 0-255 scale.
    pub alert_threshold: f32,
    /// Initial render target size.
    pub drawable_size: Size,
    pub rotation: Rotation,
    /// Initial live toggles.
    pub toggles: FrameConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            roi: Roi::default(),
            window_size: 10,
            alert_threshold: 200.0,
            drawable_size: Size::default(),
            rotation: Rotation::default(),
            toggles: FrameConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a JSON config file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::Invalid("window_size must be at least 1".into()));
        }
        if self.roi.width == 0 || self.roi.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "ROI must be non-empty, got {}x{}",
                self.roi.width, self.roi.height
            )));
        }
        if self.drawable_size.width == 0 || self.drawable_size.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "drawable size must be non-zero, got {}x{}",
                self.drawable_size.width, self.drawable_size.height
            )));
        }
        if !self.alert_threshold.is_finite() {
            return Err(ConfigError::Invalid("alert_threshold must be finite".into()));
        }
        Ok(())
    }

    pub fn with_roi(mut self, roi: Roi) -> Self {
        self.roi = roi;
        self
    }

    pub fn with_window_size(mut self, window_size: u32) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_alert_threshold(mut self, threshold: f32) -> Self {
        self.alert_threshold = threshold;
        self
    }

    pub fn with_drawable_size(mut self, width: u32, height: u32) -> Self {
        self.drawable_size = Size::new(width, height);
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_toggles(mut self, toggles: FrameConfig) -> Self {
        self.toggles = toggles;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.roi, Roi::new(368, 505, 100, 100));
        assert_eq!(config.window_size, 10);
        assert_eq!(config.alert_threshold, 200.0);
        assert_eq!(config.drawable_size, Size::new(750, 1334));
        assert_eq!(config.rotation, Rotation::None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = PipelineConfig::from_json(r#"{ "window_size": 5, "rotation": "cw90" }"#).unwrap();
        assert_eq!(config.window_size, 5);
        assert_eq!(config.rotation, Rotation::Cw90);
        assert_eq!(config.roi, Roi::default());
        assert!(config.toggles.use_disparity);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            PipelineConfig::from_json(r#"{ "window_size": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        let empty_roi = PipelineConfig::default().with_roi(Roi::new(0, 0, 0, 10));
        assert!(matches!(empty_roi.validate(), Err(ConfigError::Invalid(_))));
        let no_target = PipelineConfig::default().with_drawable_size(0, 100);
        assert!(matches!(no_target.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            PipelineConfig::from_json("{ window_size: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("depthkit-pipeline-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "alert_threshold": 150.0, "drawable_size": { "width": 64, "height": 96 } }"#).unwrap();
        let config = PipelineConfig::load(&path);
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.alert_threshold, 150.0);
        assert_eq!(config.drawable_size, Size::new(64, 96));
        assert_eq!(config.window_size, 10);

        let missing = std::env::temp_dir().join("depthkit-no-such-config.json");
        assert!(matches!(PipelineConfig::load(&missing), Err(ConfigError::Io(_))));
    }
}
