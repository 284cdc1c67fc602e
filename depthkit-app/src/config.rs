//! Application configuration file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use depthkit_live::{ConfigError, PipelineConfig};
use depthkit_recon::ReconstructionConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything `--config` can set. Missing sections take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub reconstruction: ReconstructionConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline.validate()?;
        let margin = self.reconstruction.near_plane_margin;
        if !margin.is_finite() || margin < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "near_plane_margin must be a non-negative number, got {margin}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_default_independently() {
        let config: AppConfig = serde_json::from_str(r#"{ "reconstruction": { "near_plane_margin": 0.5 } }"#).unwrap();
        assert_eq!(config.reconstruction.near_plane_margin, 0.5);
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_margin_rejected() {
        let config: AppConfig = serde_json::from_str(r#"{ "reconstruction": { "near_plane_margin": -1.0 } }"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
