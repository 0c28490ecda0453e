// ============================================================================
// mvprep-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig for callers that only want to change a
// few values. Unset values keep the defaults from CoreConfig::default().

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::CoreConfig;
use crate::error::CoreResult;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use mvprep_core::config::CoreConfigBuilder;
///
/// let config = CoreConfigBuilder::new()
///     .target_size(640, 360)
///     .scene_threshold(0.35)
///     .min_scene_len(12)
///     .scene_length_log("stats/scene_length.csv")
///     .scene_count_log("stats/scene_number.csv")
///     .build()
///     .unwrap();
/// assert_eq!(config.scene_detection.min_scene_len, 12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a builder seeded with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Sets the delivered frame size.
    pub fn target_size(mut self, width: u32, height: u32) -> Self {
        self.config.harmonize.target_width = width;
        self.config.harmonize.target_height = height;
        self
    }

    /// Sets the tolerance band around target aspect ratios.
    pub fn ratio_tolerance(mut self, tolerance: f64) -> Self {
        self.config.harmonize.ratio_tolerance = tolerance;
        self
    }

    /// Sets the deviation above which residual black bars are cropped.
    pub fn residual_tolerance(mut self, tolerance: f64) -> Self {
        self.config.harmonize.residual_tolerance = tolerance;
        self
    }

    /// Sets the expected letterbox height deviation of ultra-wide assets.
    pub fn letterbox_deviation(mut self, deviation: f64) -> Self {
        self.config.harmonize.letterbox_deviation = deviation;
        self
    }

    /// Sets the content-difference threshold for scene cuts.
    pub fn scene_threshold(mut self, threshold: f64) -> Self {
        self.config.scene_detection.threshold = threshold;
        self
    }

    /// Sets the minimum scene length in frames.
    pub fn min_scene_len(mut self, frames: u64) -> Self {
        self.config.scene_detection.min_scene_len = frames;
        self
    }

    /// Forces a downscale factor for scene analysis.
    pub fn downscale_factor(mut self, factor: u32) -> Self {
        self.config.scene_detection.downscale_factor = Some(factor);
        self
    }

    /// Sets the per-scene file name template.
    pub fn split_template(mut self, template: &str) -> Self {
        self.config.split.template = template.to_string();
        self
    }

    /// Sets whether ffmpeg output is hidden while splitting.
    pub fn suppress_split_output(mut self, suppress: bool) -> Self {
        self.config.split.suppress_output = suppress;
        self
    }

    /// Sets the scene-length log path.
    pub fn scene_length_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.stats.scene_length_log = path.into();
        self
    }

    /// Sets the scene-count log path.
    pub fn scene_count_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.stats.scene_count_log = path.into();
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> CoreResult<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
