//! Heatmap settings loaded from a TOML file.
//!
//! ```toml
//! resolution = 120
//! margin = { proportional = 0.1 }
//! classification = "rounded"
//!
//! [interpolation.nni.fallback]
//! offset = 0.1
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    map::{algorithm::InterpolationMethod, lerp::MarginPolicy},
    quality::ClassificationMode,
    HeatmapError,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] HeatmapError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Evaluation points along each axis.
    pub resolution: usize,
    pub margin: MarginPolicy,
    /// Fewest valid points before a heatmap is built.
    /// Unset means the coordinate resolver decides.
    pub min_samples: Option<usize>,
    pub interpolation: InterpolationMethod,
    pub classification: ClassificationMode,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            resolution: 100,
            margin: MarginPolicy::default(),
            min_samples: None,
            interpolation: InterpolationMethod::default(),
            classification: ClassificationMode::default(),
        }
    }
}

impl HeatmapConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: HeatmapConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load with default fallback
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no heatmap config found, using defaults");
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded heatmap config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load heatmap config, using defaults");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), HeatmapError> {
        if self.resolution < 2 {
            return Err(HeatmapError::InvalidResolution(self.resolution));
        }
        self.margin.validate()?;
        if self.min_samples == Some(0) {
            return Err(HeatmapError::InvalidMinSamples);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::algorithm::{idw::IDWStrategy, nni::NNIStrategy};

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(HeatmapConfig::from_toml_str("").unwrap(), HeatmapConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = HeatmapConfig::from_toml_str(
            r#"
            resolution = 64
            margin = { proportional = 0.25 }
            min_samples = 5
            classification = "coarse"

            [interpolation.nni.fallback]
            offset = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.resolution, 64);
        assert_eq!(config.margin, MarginPolicy::Proportional(0.25));
        assert_eq!(config.min_samples, Some(5));
        assert_eq!(config.classification, ClassificationMode::Coarse);
        assert_eq!(
            config.interpolation,
            InterpolationMethod::NNI(NNIStrategy {
                fallback: IDWStrategy {
                    offset: 0.5,
                    ..IDWStrategy::default()
                }
            })
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            HeatmapConfig::from_toml_str("resolution = 1"),
            Err(ConfigError::Invalid(HeatmapError::InvalidResolution(1)))
        ));
        assert!(matches!(
            HeatmapConfig::from_toml_str("margin = { absolute = -2.0 }"),
            Err(ConfigError::Invalid(HeatmapError::InvalidMargin(_)))
        ));
        assert!(matches!(
            HeatmapConfig::from_toml_str("min_samples = 0"),
            Err(ConfigError::Invalid(HeatmapError::InvalidMinSamples))
        ));
        assert!(matches!(
            HeatmapConfig::from_toml_str("classification = \"loud\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = HeatmapConfig::load_or_default("does/not/exist/heatmap.toml");
        assert_eq!(config, HeatmapConfig::default());
        assert!(matches!(
            HeatmapConfig::load("does/not/exist/heatmap.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
