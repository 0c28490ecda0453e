//! Core library for preparing music-video libraries with ffmpeg and ffprobe.
//!
//! This crate normalizes videos to one of two canonical layouts (16:9 or
//! 40:17, delivered at 640x360) and splits them into per-camera-movement
//! scenes, caching detection work and recording scene statistics.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mvprep_core::config::CoreConfig;
//! use mvprep_core::external::{
//!     CrateFfprobeExecutor, FfmpegCropDetector, FfmpegSceneDetector, FfmpegSceneSplitter,
//!     FfmpegTransformer, SidecarSpawner,
//! };
//! use mvprep_core::scenes::{FileStatsSink, SceneSplitWorkflow};
//! use mvprep_core::HarmonizationEngine;
//! use std::path::Path;
//!
//! let config = CoreConfig::default();
//! let video = Path::new("/library/song1.mp4");
//!
//! let engine = HarmonizationEngine::new(
//!     FfmpegCropDetector::new(SidecarSpawner, config.crop_detection.clone()),
//!     CrateFfprobeExecutor::new(),
//!     FfmpegTransformer::new(SidecarSpawner),
//!     config.harmonize.clone(),
//! );
//! println!("layout: {}", engine.normalize(video));
//!
//! let mut workflow = SceneSplitWorkflow::new(
//!     FfmpegSceneDetector::new(SidecarSpawner, CrateFfprobeExecutor::new(), config.scene_detection.clone()),
//!     FfmpegSceneSplitter::new(SidecarSpawner),
//!     FileStatsSink::new(&config.stats.scene_length_log, &config.stats.scene_count_log),
//!     config.split.clone(),
//! );
//! let scenes = workflow.segment(video).unwrap();
//! println!("{} scenes", scenes.len());
//! ```

pub mod asset;
pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod geometry;
pub mod harmonize;
pub mod layout;
pub mod plan;
pub mod scenes;

// Re-exports for public API
pub use asset::VideoAsset;
pub use config::{CoreConfig, CoreConfigBuilder};
pub use discovery::{find_video_assets, is_video_asset};
pub use error::{CoreError, CoreResult};
pub use geometry::Dimensions;
pub use harmonize::{HarmonizationEngine, HarmonizeReport, StepOutcome, StepReport};
pub use layout::CanonicalLayout;
pub use plan::{CropPlan, FilterOp};
pub use scenes::{
    DetectionCache, FileStatsSink, FrameTimecode, MemoryStatsSink, Scene, SceneSplitWorkflow,
    SceneStatsRecord, SegmentOutcome, StatsSink,
};
