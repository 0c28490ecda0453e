//! Configuration structures and constants for the mvprep-core library.
//!
//! This module provides the configuration for harmonization geometry, crop
//! and scene detection, scene splitting and the statistics logs. Every field
//! has a default; a TOML file and `MVPREP_*` environment variables can
//! override them.

mod builder;
mod detection;
mod harmonize;
mod output;
mod utils;

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use builder::CoreConfigBuilder;
pub use detection::{CropDetectionConfig, SceneDetectionConfig};
pub use harmonize::{
    DEFAULT_LAYOUT_SPLIT_RATIO, DEFAULT_LETTERBOX_DEVIATION, DEFAULT_RATIO_TOLERANCE,
    DEFAULT_RESIDUAL_TOLERANCE, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH, HarmonizeConfig,
};
pub use output::{
    DEFAULT_SPLIT_TEMPLATE, SCENE_NUMBER_PLACEHOLDER, SplitConfig, StatsConfig,
    VIDEO_NAME_PLACEHOLDER,
};

/// Environment variable overriding the scene cut threshold.
pub const ENV_SCENE_THRESHOLD: &str = "MVPREP_SCENE_THRESHOLD";
/// Environment variable overriding the minimum scene length in frames.
pub const ENV_MIN_SCENE_LEN: &str = "MVPREP_MIN_SCENE_LEN";
/// Environment variable overriding the delivered width.
pub const ENV_TARGET_WIDTH: &str = "MVPREP_TARGET_WIDTH";
/// Environment variable overriding the delivered height.
pub const ENV_TARGET_HEIGHT: &str = "MVPREP_TARGET_HEIGHT";
/// Environment variable overriding the scene-length log path.
pub const ENV_SCENE_LENGTH_LOG: &str = "MVPREP_SCENE_LENGTH_LOG";
/// Environment variable overriding the scene-count log path.
pub const ENV_SCENE_COUNT_LOG: &str = "MVPREP_SCENE_COUNT_LOG";

/// Main configuration structure for the mvprep-core library.
///
/// # Examples
///
/// ```rust
/// use mvprep_core::config::CoreConfig;
///
/// let config = CoreConfig::default();
/// assert_eq!(config.harmonize.target_width, 640);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub harmonize: HarmonizeConfig,
    pub crop_detection: CropDetectionConfig,
    pub scene_detection: SceneDetectionConfig,
    pub split: SplitConfig,
    pub stats: StatsConfig,
}

impl CoreConfig {
    /// Loads a TOML configuration file. Missing sections and fields keep
    /// their defaults.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            CoreError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration as TOML.
    pub fn save_to_file(&self, path: &Path) -> CoreResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Applies `MVPREP_*` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(utils::process_env)
    }

    /// Applies `MVPREP_*` overrides read through `lookup`.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.scene_detection.threshold =
            utils::env_parse(&lookup, ENV_SCENE_THRESHOLD, self.scene_detection.threshold);
        self.scene_detection.min_scene_len =
            utils::env_parse(&lookup, ENV_MIN_SCENE_LEN, self.scene_detection.min_scene_len);
        self.harmonize.target_width =
            utils::env_parse(&lookup, ENV_TARGET_WIDTH, self.harmonize.target_width);
        self.harmonize.target_height =
            utils::env_parse(&lookup, ENV_TARGET_HEIGHT, self.harmonize.target_height);
        self.stats.scene_length_log =
            utils::env_path(&lookup, ENV_SCENE_LENGTH_LOG, self.stats.scene_length_log);
        self.stats.scene_count_log =
            utils::env_path(&lookup, ENV_SCENE_COUNT_LOG, self.stats.scene_count_log);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        let h = &self.harmonize;
        if h.target_width == 0 || h.target_height == 0 {
            return Err(CoreError::Config(format!(
                "Target dimensions must be positive, got {}x{}",
                h.target_width, h.target_height
            )));
        }
        if h.target_width % 2 != 0 || h.target_height % 2 != 0 {
            return Err(CoreError::Config(format!(
                "Target dimensions must be even, got {}x{}",
                h.target_width, h.target_height
            )));
        }
        for (name, value) in [
            ("ratio_tolerance", h.ratio_tolerance),
            ("residual_tolerance", h.residual_tolerance),
            ("letterbox_deviation", h.letterbox_deviation),
            ("layout_split_ratio", h.layout_split_ratio),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let s = &self.scene_detection;
        if !(s.threshold > 0.0 && s.threshold <= 1.0) {
            return Err(CoreError::Config(format!(
                "Scene threshold must be in (0, 1], got {}",
                s.threshold
            )));
        }
        if s.min_scene_len == 0 {
            return Err(CoreError::Config(
                "Minimum scene length must be at least one frame".to_string(),
            ));
        }
        if s.downscale_factor == Some(0) {
            return Err(CoreError::Config(
                "Downscale factor must be at least 1".to_string(),
            ));
        }

        if self.crop_detection.sample_frames == 0 {
            return Err(CoreError::Config(
                "Crop detection needs at least one sampled frame".to_string(),
            ));
        }

        if !self.split.template.contains(SCENE_NUMBER_PLACEHOLDER) {
            return Err(CoreError::Config(format!(
                "Split template '{}' must contain {SCENE_NUMBER_PLACEHOLDER}",
                self.split.template
            )));
        }

        Ok(())
    }
}
