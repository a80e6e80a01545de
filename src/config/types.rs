//! Configuration type definitions.

use crate::constants::{
    DEFAULT_TARGET_RECALL, DEFAULT_TELEMETRY_THRESHOLD, DEFAULT_TEMPERATURE, DEFAULT_TILE_SIZE,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Inference settings.
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Default pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Default ONNX model path.
    pub model: Option<PathBuf>,

    /// Recall target for calibration.
    pub target_recall: f64,

    /// Temperature divisor applied to logits before softmax.
    pub temperature: f64,

    /// Tile edge length in pixels.
    pub tile_size: u32,

    /// Keep threshold used when no calibration artifact is supplied.
    pub threshold: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: None,
            target_recall: DEFAULT_TARGET_RECALL,
            temperature: DEFAULT_TEMPERATURE,
            tile_size: DEFAULT_TILE_SIZE,
            threshold: DEFAULT_TELEMETRY_THRESHOLD,
        }
    }
}

/// Inference device configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InferenceDevice {
    /// Automatically select (GPU if available, else CPU).
    #[default]
    Auto,
    /// Force GPU (CUDA), fall back to CPU with a warning.
    Gpu,
    /// Force CPU inference.
    Cpu,
}

/// Inference settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Device to use for inference.
    pub device: InferenceDevice,
}

impl Config {
    /// Validate value ranges that the CLI parsers cannot cover.
    pub fn validate(&self) -> Result<(), String> {
        let d = &self.defaults;
        if !(d.target_recall > 0.0 && d.target_recall <= 1.0) {
            return Err(format!(
                "defaults.target_recall must be in (0.0, 1.0], got {}",
                d.target_recall
            ));
        }
        if !(d.temperature.is_finite() && d.temperature > 0.0) {
            return Err(format!(
                "defaults.temperature must be a positive number, got {}",
                d.temperature
            ));
        }
        if !(0.0..=1.0).contains(&d.threshold) {
            return Err(format!(
                "defaults.threshold must be between 0.0 and 1.0, got {}",
                d.threshold
            ));
        }
        if d.tile_size == 0 {
            return Err("defaults.tile_size must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_config_default_values() {
        let defaults = DefaultsConfig::default();
        assert_eq!(defaults.target_recall, 0.95);
        assert_eq!(defaults.temperature, 1.0);
        assert_eq!(defaults.tile_size, 64);
        assert_eq!(defaults.threshold, 0.6);
        assert!(defaults.model.is_none());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_target_recall() {
        let mut config = Config::default();
        config.defaults.target_recall = 0.0;
        assert!(config.validate().is_err());
        config.defaults.target_recall = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let mut config = Config::default();
        config.defaults.temperature = 0.0;
        assert!(config.validate().is_err());
        config.defaults.temperature = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_device_parses_lowercase() {
        let config: Config = toml::from_str("[inference]\ndevice = \"gpu\"\n").unwrap();
        assert_eq!(config.inference.device, InferenceDevice::Gpu);
    }
}
