//! Harmonization configuration
//!
//! Geometry targets and tolerances used by the four harmonization steps.

use serde::{Deserialize, Serialize};

/// Final delivered width in pixels.
pub const DEFAULT_TARGET_WIDTH: u32 = 640;

/// Final delivered height in pixels.
pub const DEFAULT_TARGET_HEIGHT: u32 = 360;

/// Half-width of the accepted band around a target aspect ratio.
pub const DEFAULT_RATIO_TOLERANCE: f64 = 0.05;

/// Relative deviation between resolution and content box tolerated as
/// measurement noise before residual bars are cropped.
pub const DEFAULT_RESIDUAL_TOLERANCE: f64 = 0.025;

/// Expected height deviation of a 40:17 picture letterboxed in 16:9
/// (1 - 272/360). Heights that deviate by about this much keep their bars.
pub const DEFAULT_LETTERBOX_DEVIATION: f64 = 0.244;

/// Content ratios below this are widescreen, the rest ultra-wide.
pub const DEFAULT_LAYOUT_SPLIT_RATIO: f64 = 2.0;

/// Harmonization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonizeConfig {
    /// Final width of every harmonized asset
    pub target_width: u32,

    /// Final height of every harmonized asset
    pub target_height: u32,

    /// Tolerance band around the target aspect ratio (coarse correction and scaling)
    pub ratio_tolerance: f64,

    /// Deviation above which remaining black bars are removed
    pub residual_tolerance: f64,

    /// Height deviation left alone because it is the expected letterbox
    pub letterbox_deviation: f64,

    /// Aspect ratio separating widescreen from ultra-wide content
    pub layout_split_ratio: f64,
}

impl Default for HarmonizeConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            ratio_tolerance: DEFAULT_RATIO_TOLERANCE,
            residual_tolerance: DEFAULT_RESIDUAL_TOLERANCE,
            letterbox_deviation: DEFAULT_LETTERBOX_DEVIATION,
            layout_split_ratio: DEFAULT_LAYOUT_SPLIT_RATIO,
        }
    }
}

impl HarmonizeConfig {
    /// Aspect ratio of the delivered frame (16:9 with the defaults).
    #[must_use]
    pub fn target_ratio(&self) -> f64 {
        f64::from(self.target_width) / f64::from(self.target_height)
    }
}
