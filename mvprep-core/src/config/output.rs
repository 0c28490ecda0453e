//! Output configuration module
//!
//! Scene splitting (file naming and encoder arguments) and the paths of the
//! two shared statistics logs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder replaced by the asset id in split templates.
pub const VIDEO_NAME_PLACEHOLDER: &str = "$VIDEO_NAME";

/// Placeholder replaced by the 1-based, zero-padded scene number.
pub const SCENE_NUMBER_PLACEHOLDER: &str = "$SCENE_NUMBER";

/// Default per-scene file name.
pub const DEFAULT_SPLIT_TEMPLATE: &str = "$VIDEO_NAME-Scene-$SCENE_NUMBER.mp4";

/// Scene splitting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// File name template for each scene, relative to the asset's folder
    pub template: String,

    /// Hide ffmpeg's own output while splitting
    pub suppress_output: bool,

    /// Encoder arguments used for every scene file
    pub encoder_args: Vec<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_SPLIT_TEMPLATE.to_string(),
            suppress_output: true,
            encoder_args: ["-c:v", "libx264", "-preset", "veryfast", "-crf", "22", "-c:a", "aac"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Statistics log configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Append-only log of `asset,frames,seconds` lines, one per scene
    pub scene_length_log: PathBuf,

    /// Append-only log of `asset,count` lines, one per asset
    pub scene_count_log: PathBuf,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            scene_length_log: PathBuf::from("scene_length.csv"),
            scene_count_log: PathBuf::from("scene_number.csv"),
        }
    }
}
