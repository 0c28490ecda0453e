//! Detection configuration module
//!
//! Defines the configuration structures for crop detection (black bar
//! sampling) and scene detection (content-difference cuts).

use serde::{Deserialize, Serialize};

/// Crop detection configuration for black bar detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropDetectionConfig {
    /// Black level limit passed to `cropdetect`
    pub limit: u32,

    /// Value the detected width/height must be divisible by
    pub round: u32,

    /// Frame count after which cropdetect resets (0 = never)
    pub reset: u32,

    /// Seconds skipped before sampling, to get past intros
    pub skip_secs: u32,

    /// Number of frames sampled
    pub sample_frames: u32,
}

impl Default for CropDetectionConfig {
    fn default() -> Self {
        Self {
            limit: 24,
            round: 16,
            reset: 0,
            skip_secs: 10,
            sample_frames: 1000,
        }
    }
}

impl CropDetectionConfig {
    /// The `-vf` argument for the sampling run.
    #[must_use]
    pub fn filter(&self) -> String {
        format!("cropdetect={}:{}:{}", self.limit, self.round, self.reset)
    }
}

/// Scene detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDetectionConfig {
    /// Frame difference score (0-1) at or above which a cut is placed
    pub threshold: f64,

    /// Minimum scene length in frames
    pub min_scene_len: u64,

    /// Width the analysed frames are downscaled toward
    pub downscale_min_width: u32,

    /// Fixed downscale factor, overriding the width-derived one
    pub downscale_factor: Option<u32>,
}

impl Default for SceneDetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            min_scene_len: 15,
            downscale_min_width: 256,
            downscale_factor: None,
        }
    }
}

impl SceneDetectionConfig {
    /// Integer downscale factor for a source `width`, never below 1.
    #[must_use]
    pub fn downscale_for(&self, width: u32) -> u32 {
        self.downscale_factor
            .unwrap_or_else(|| width / self.downscale_min_width.max(1))
            .max(1)
    }
}
