//! Scene segmentation: timecodes, cut placement and the split workflow.
//!
//! A scene is a `(start, end)` pair of frame timecodes, end exclusive. The
//! detector produces per-frame difference scores; [`scenes_from_scores`]
//! turns them into scenes, and [`SceneSplitWorkflow`] drives detection,
//! statistics and splitting for one asset at a time.

mod cache;
mod stats;
mod status;
mod template;
mod workflow;

pub use cache::DetectionCache;
pub use stats::{FileStatsSink, MemoryStatsSink, SceneStatsRecord, StatsSink};
pub use status::{FolderStatusMarker, MANIFEST_FILE_NAME, SegmentationStatus, StatusMarker};
pub use template::SplitTemplate;
pub use workflow::{FrameSourceGuard, SceneSplitWorkflow, SegmentOutcome};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A frame position at a given frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTimecode {
    frame: u64,
    fps: f64,
}

impl FrameTimecode {
    #[must_use]
    pub fn new(frame: u64, fps: f64) -> Self {
        Self { frame, fps }
    }

    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Position in seconds; zero when the frame rate is unknown.
    #[must_use]
    pub fn seconds(&self) -> f64 {
        if self.fps > 0.0 {
            self.frame as f64 / self.fps
        } else {
            0.0
        }
    }
}

impl fmt::Display for FrameTimecode {
    /// Formats as `HH:MM:SS.mmm`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = (self.seconds() * 1000.0).round() as u64;
        let (hours, rem) = (total_ms / 3_600_000, total_ms % 3_600_000);
        let (minutes, rem) = (rem / 60_000, rem % 60_000);
        let (secs, ms) = (rem / 1000, rem % 1000);
        write!(f, "{hours:02}:{minutes:02}:{secs:02}.{ms:03}")
    }
}

/// A contiguous run of frames, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    start: FrameTimecode,
    end: FrameTimecode,
}

impl Scene {
    #[must_use]
    pub fn new(start: FrameTimecode, end: FrameTimecode) -> Self {
        Self { start, end }
    }

    /// Builds a scene from frame numbers sharing one frame rate.
    #[must_use]
    pub fn from_frames(start: u64, end: u64, fps: f64) -> Self {
        Self::new(FrameTimecode::new(start, fps), FrameTimecode::new(end, fps))
    }

    #[must_use]
    pub fn start(&self) -> FrameTimecode {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> FrameTimecode {
        self.end
    }

    #[must_use]
    pub fn frame_length(&self) -> u64 {
        self.end.frame.saturating_sub(self.start.frame)
    }

    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        (self.end.seconds() - self.start.seconds()).max(0.0)
    }
}

/// Places cuts where the difference score reaches `threshold`.
///
/// A cut needs at least `min_scene_len` frames since the previous cut (or
/// the start of the video). Without any cut the whole video is one scene;
/// an empty score list yields no scenes.
#[must_use]
pub fn scenes_from_scores(scores: &[f64], fps: f64, threshold: f64, min_scene_len: u64) -> Vec<Scene> {
    let total = scores.len() as u64;
    if total == 0 {
        return Vec::new();
    }

    let mut boundaries = vec![0u64];
    let mut last_cut = 0u64;
    for (frame, &score) in scores.iter().enumerate().skip(1) {
        let frame = frame as u64;
        if score >= threshold && frame - last_cut >= min_scene_len {
            boundaries.push(frame);
            last_cut = frame;
        }
    }
    boundaries.push(total);

    boundaries
        .windows(2)
        .map(|pair| Scene::from_frames(pair[0], pair[1], fps))
        .collect()
}
