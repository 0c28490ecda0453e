// ============================================================================
// mvprep-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Collaborator Contracts and their ffmpeg/ffprobe Backends
//
// The harmonization engine and the scene-split workflow never talk to ffmpeg
// directly. They depend on the collaborator traits declared here; the
// submodules provide the concrete implementations that shell out through an
// FfmpegSpawner or query the ffprobe crate.
//
// KEY COMPONENTS:
// - CropDetector, ResolutionProbe, VideoTransformer: harmonization collaborators
// - SceneDetector / FrameSource, SceneSplitter: segmentation collaborators
// - FfmpegSpawner / FfmpegProcess: process abstraction shared by all backends
// - check_dependency: PATH probe for external binaries
//
// Consumers inject their own implementations for tests; the `mocks` module
// carries the ones this crate uses.

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::geometry::Dimensions;
use crate::plan::CropPlan;
use crate::scenes::{DetectionCache, Scene};

// ---- Standard library imports ----
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Most-frequent-crop detection through ffmpeg's `cropdetect` filter
pub mod crop_detector;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for executing ffprobe queries
pub mod ffprobe_executor;

/// Scene scoring through ffmpeg's scene-change metric
pub mod scene_detector;

/// Per-scene file extraction
pub mod scene_splitter;

/// In-place filter application guarded by a working copy
pub mod transformer;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crop_detector::{FfmpegCropDetector, parse_crop_from_output};
pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegRunOutput, FfmpegSpawner, SidecarProcess, SidecarSpawner,
    run_to_completion,
};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor, VideoProperties, get_duration};
pub use scene_detector::{FfmpegFrameSource, FfmpegSceneDetector, parse_scene_scores};
pub use scene_splitter::{FfmpegSceneSplitter, SplitRequest};
pub use transformer::{FfmpegTransformer, WorkingCopy};

// ============================================================================
// COLLABORATOR CONTRACTS
// ============================================================================

/// Samples frames of a video and reports the picture area without bars.
pub trait CropDetector {
    /// Returns the detected content box, or `None` if the file is missing.
    fn detect_content_box(&self, video: &Path) -> CoreResult<Option<Dimensions>>;
}

/// Reports the full encoded resolution of a video.
pub trait ResolutionProbe {
    /// Returns the resolution, or `None` if the file is missing.
    fn resolution(&self, video: &Path) -> CoreResult<Option<Dimensions>>;
}

/// Applies a filter graph to a video, replacing the file in place.
///
/// On failure the original file must be left untouched.
pub trait VideoTransformer {
    fn apply(&self, video: &Path, plan: &CropPlan) -> CoreResult<()>;
}

/// Frame-access handle opened for one asset.
///
/// `release` must be idempotent; callers hold the source in a guard that
/// calls it on every exit path.
pub trait FrameSource {
    /// Returns the ordered scene list, reusing and refreshing `cache`.
    fn detect_scenes(&mut self, cache: &mut DetectionCache) -> CoreResult<Vec<Scene>>;

    /// Releases whatever the source holds (decoder processes, file handles).
    fn release(&mut self);
}

/// Opens frame sources for scene detection.
pub trait SceneDetector {
    type Source: FrameSource;

    fn open(&self, video: &Path) -> CoreResult<Self::Source>;
}

/// Cuts a source video into one file per scene.
pub trait SceneSplitter {
    /// Whether the external splitting capability can run at all.
    fn is_available(&self) -> bool;

    /// Writes one file per scene and returns the paths in scene order.
    fn split(
        &self,
        video: &Path,
        scenes: &[Scene],
        request: &SplitRequest,
    ) -> CoreResult<Vec<PathBuf>>;
}

impl<T: CropDetector + ?Sized> CropDetector for &T {
    fn detect_content_box(&self, video: &Path) -> CoreResult<Option<Dimensions>> {
        (**self).detect_content_box(video)
    }
}

impl<T: ResolutionProbe + ?Sized> ResolutionProbe for &T {
    fn resolution(&self, video: &Path) -> CoreResult<Option<Dimensions>> {
        (**self).resolution(video)
    }
}

impl<T: VideoTransformer + ?Sized> VideoTransformer for &T {
    fn apply(&self, video: &Path, plan: &CropPlan) -> CoreResult<()> {
        (**self).apply(video, plan)
    }
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` with output discarded; only whether the
/// process could be started matters.
///
/// # Returns
///
/// * `Ok(())` - The command was found
/// * `Err(CoreError::DependencyNotFound)` - The command is not on PATH
/// * `Err(CoreError::CommandStart)` - The command exists but fails to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!(
                "Failed to start dependency check command '{}': {}",
                cmd_name,
                e
            );
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency() {
        let result = check_dependency("mvprep-surely-not-installed-tool");
        assert!(matches!(result, Err(CoreError::DependencyNotFound(_))));
    }
}
