// ============================================================================
// mvprep-core/src/scenes/workflow.rs
// ============================================================================
//
// SCENE SPLIT WORKFLOW: Idempotent, Cache-aware Segmentation of one Asset
//
// Order of operations for an asset:
//   1. missing source or an existing segmentation -> nothing to do
//   2. splitter unavailable -> warn, nothing to do
//   3. load the detection cache sidecar
//   4. open a frame source, detect, release (always)
//   5. save freshly computed scores
//   6. record statistics, create the output folder, split, mark segmented
//
// KEY COMPONENTS:
// - SceneSplitWorkflow: the orchestration above
// - FrameSourceGuard: releases the frame source on every exit path
// - SegmentOutcome: what the workflow did

use super::{DetectionCache, Scene, SceneStatsRecord, SegmentationStatus, StatsSink, StatusMarker};
use super::status::FolderStatusMarker;
use crate::asset::VideoAsset;
use crate::config::SplitConfig;
use crate::error::CoreResult;
use crate::external::{FrameSource, SceneDetector, SceneSplitter, SplitRequest};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What [`SceneSplitWorkflow::run`] did for an asset.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentOutcome {
    MissingSource,
    /// The asset's output folder already exists.
    AlreadySegmented,
    /// The splitting tool is not installed; the asset is left unsegmented.
    SplitterUnavailable,
    /// Detection found nothing to split.
    NoScenes,
    Segmented {
        scenes: Vec<Scene>,
        files: Vec<PathBuf>,
    },
}

impl SegmentOutcome {
    /// Scenes produced by this run; empty unless the asset was segmented.
    #[must_use]
    pub fn scenes(&self) -> &[Scene] {
        match self {
            Self::Segmented { scenes, .. } => scenes,
            _ => &[],
        }
    }

    #[must_use]
    pub fn into_scenes(self) -> Vec<Scene> {
        match self {
            Self::Segmented { scenes, .. } => scenes,
            _ => Vec::new(),
        }
    }
}

/// Owns a frame source and releases it when dropped.
pub struct FrameSourceGuard<S: FrameSource> {
    source: S,
}

impl<S: FrameSource> FrameSourceGuard<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn detect_scenes(&mut self, cache: &mut DetectionCache) -> CoreResult<Vec<Scene>> {
        self.source.detect_scenes(cache)
    }
}

impl<S: FrameSource> Drop for FrameSourceGuard<S> {
    fn drop(&mut self) {
        self.source.release();
    }
}

/// Detects, records and splits the scenes of one asset at a time.
pub struct SceneSplitWorkflow<D, P, K, M = FolderStatusMarker> {
    detector: D,
    splitter: P,
    sink: K,
    marker: M,
    split: SplitConfig,
}

impl<D, P, K> SceneSplitWorkflow<D, P, K, FolderStatusMarker>
where
    D: SceneDetector,
    P: SceneSplitter,
    K: StatsSink,
{
    /// Workflow using the output folder as the segmentation marker.
    pub fn new(detector: D, splitter: P, sink: K, split: SplitConfig) -> Self {
        Self {
            detector,
            splitter,
            sink,
            marker: FolderStatusMarker,
            split,
        }
    }
}

impl<D, P, K, M> SceneSplitWorkflow<D, P, K, M>
where
    D: SceneDetector,
    P: SceneSplitter,
    K: StatsSink,
    M: StatusMarker,
{
    /// Swaps the segmentation marker.
    pub fn with_marker<M2: StatusMarker>(self, marker: M2) -> SceneSplitWorkflow<D, P, K, M2> {
        SceneSplitWorkflow {
            detector: self.detector,
            splitter: self.splitter,
            sink: self.sink,
            marker,
            split: self.split,
        }
    }

    #[must_use]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Segments `video` and returns its scenes; empty when there was
    /// nothing to do.
    pub fn segment(&mut self, video: &Path) -> CoreResult<Vec<Scene>> {
        self.run(video).map(SegmentOutcome::into_scenes)
    }

    /// Segments `video` and reports what happened.
    pub fn run(&mut self, video: &Path) -> CoreResult<SegmentOutcome> {
        let started = Instant::now();
        let asset = VideoAsset::new(video);

        if !asset.exists() {
            log::warn!("Skipping {}: file does not exist", video.display());
            return Ok(SegmentOutcome::MissingSource);
        }
        if self.marker.status(&asset) == SegmentationStatus::Segmented {
            log::info!(
                "{} already exists, {} is probably already split",
                asset.output_dir().display(),
                video.display()
            );
            return Ok(SegmentOutcome::AlreadySegmented);
        }
        if !self.splitter.is_available() {
            log::warn!(
                "ffmpeg is not installed on this computer. Please install it before splitting {}",
                video.display()
            );
            return Ok(SegmentOutcome::SplitterUnavailable);
        }

        let request = SplitRequest::from_config(asset.output_dir(), asset.id(), &self.split)?;

        log::info!("Analyzing video {}", video.display());
        let sidecar = asset.stats_sidecar();
        let mut cache = DetectionCache::load_or_default(&sidecar);

        let scenes = {
            let mut source = FrameSourceGuard::new(self.detector.open(video)?);
            source.detect_scenes(&mut cache)?
        };

        if cache.is_dirty() {
            if let Err(e) = cache.save(&sidecar) {
                log::warn!("Could not save detection cache {}: {}", sidecar.display(), e);
            }
        }

        log::info!("{} scenes obtained for {}", scenes.len(), video.display());
        if scenes.is_empty() {
            return Ok(SegmentOutcome::NoScenes);
        }

        self.sink.record(&stats_records(&asset.id(), &scenes))?;

        log::info!(
            "Splitting the video. Put scenes in {}/{}",
            request.output_dir.display(),
            request.template
        );
        std::fs::create_dir_all(&request.output_dir)?;
        let files = self.splitter.split(video, &scenes, &request)?;
        self.marker.mark_segmented(&asset, &scenes, &files)?;

        log::info!(
            "Finished video splitting of {} in {:.2}s",
            video.display(),
            started.elapsed().as_secs_f64()
        );
        Ok(SegmentOutcome::Segmented { scenes, files })
    }
}

/// One length record per scene followed by the count record.
fn stats_records(asset_id: &str, scenes: &[Scene]) -> Vec<SceneStatsRecord> {
    scenes
        .iter()
        .map(|scene| SceneStatsRecord::SceneLength {
            asset_id: asset_id.to_string(),
            frame_length: scene.frame_length(),
            duration_secs: scene.duration_secs(),
        })
        .chain(std::iter::once(SceneStatsRecord::SceneCount {
            asset_id: asset_id.to_string(),
            scene_count: scenes.len(),
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockSceneDetector, MockSceneSplitter};
    use crate::scenes::MemoryStatsSink;

    fn song(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("song1.mp4");
        std::fs::write(&path, b"video").unwrap();
        path
    }

    fn two_scenes() -> Vec<Scene> {
        vec![
            Scene::from_frames(0, 100, 25.0),
            Scene::from_frames(100, 250, 25.0),
        ]
    }

    #[test]
    fn test_segment_records_and_splits() {
        let dir = tempfile::tempdir().unwrap();
        let video = song(&dir);
        let detector = MockSceneDetector::new(two_scenes());
        let splitter = MockSceneSplitter::new();
        let mut workflow = SceneSplitWorkflow::new(
            detector.clone(),
            splitter.clone(),
            MemoryStatsSink::new(),
            SplitConfig::default(),
        );

        let scenes = workflow.segment(&video).unwrap();

        assert_eq!(scenes, two_scenes());
        assert_eq!(
            workflow.sink().length_lines(),
            vec!["song1,100,4.000000", "song1,150,6.000000"]
        );
        assert_eq!(workflow.sink().count_lines(), vec!["song1,2"]);
        assert!(dir.path().join("song1/song1-Scene-001.mp4").exists());
        assert!(dir.path().join("song1/song1-Scene-002.mp4").exists());
        assert!(dir.path().join("song1.mp4.stats.json").exists());
        assert_eq!(detector.opens(), 1);
        assert_eq!(detector.releases(), 1);
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let video = song(&dir);
        let detector = MockSceneDetector::new(two_scenes());
        let splitter = MockSceneSplitter::new();
        let mut workflow = SceneSplitWorkflow::new(
            detector.clone(),
            splitter.clone(),
            MemoryStatsSink::new(),
            SplitConfig::default(),
        );

        workflow.segment(&video).unwrap();
        let second = workflow.run(&video).unwrap();

        assert_eq!(second, SegmentOutcome::AlreadySegmented);
        assert!(second.scenes().is_empty());
        assert_eq!(workflow.sink().calls(), 1);
        assert_eq!(detector.opens(), 1);
        assert_eq!(splitter.calls(), 1);
    }

    #[test]
    fn test_cached_scores_are_reused() {
        let dir = tempfile::tempdir().unwrap();
        let video = song(&dir);
        let detector = MockSceneDetector::new(two_scenes());
        let mut workflow = SceneSplitWorkflow::new(
            detector.clone(),
            MockSceneSplitter::new(),
            MemoryStatsSink::new(),
            SplitConfig::default(),
        );

        workflow.run(&video).unwrap();
        std::fs::remove_dir_all(dir.path().join("song1")).unwrap();
        workflow.run(&video).unwrap();

        assert_eq!(detector.cache_hits(), 1);
    }

    #[test]
    fn test_unavailable_splitter_degrades_to_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let video = song(&dir);
        let detector = MockSceneDetector::new(two_scenes());
        let mut workflow = SceneSplitWorkflow::new(
            detector.clone(),
            MockSceneSplitter::unavailable(),
            MemoryStatsSink::new(),
            SplitConfig::default(),
        );

        let outcome = workflow.run(&video).unwrap();

        assert_eq!(outcome, SegmentOutcome::SplitterUnavailable);
        assert_eq!(detector.opens(), 0);
        assert_eq!(workflow.sink().calls(), 0);
        assert!(!dir.path().join("song1").exists());
    }

    #[test]
    fn test_detection_failure_releases_source() {
        let dir = tempfile::tempdir().unwrap();
        let video = song(&dir);
        let detector = MockSceneDetector::new(two_scenes());
        detector.fail_detection();
        let mut workflow = SceneSplitWorkflow::new(
            detector.clone(),
            MockSceneSplitter::new(),
            MemoryStatsSink::new(),
            SplitConfig::default(),
        );

        assert!(workflow.run(&video).is_err());
        assert_eq!(detector.releases(), 1);
        assert_eq!(workflow.sink().calls(), 0);
        assert!(!dir.path().join("song1").exists());
    }

    #[test]
    fn test_zero_scenes_leave_asset_unsegmented() {
        let dir = tempfile::tempdir().unwrap();
        let video = song(&dir);
        let detector = MockSceneDetector::new(Vec::new());
        let splitter = MockSceneSplitter::new();
        let mut workflow = SceneSplitWorkflow::new(
            detector.clone(),
            splitter.clone(),
            MemoryStatsSink::new(),
            SplitConfig::default(),
        );

        assert_eq!(workflow.run(&video).unwrap(), SegmentOutcome::NoScenes);
        assert_eq!(detector.releases(), 1);
        assert_eq!(splitter.calls(), 0);
        assert_eq!(workflow.sink().calls(), 0);
    }

    #[test]
    fn test_missing_source() {
        let mut workflow = SceneSplitWorkflow::new(
            MockSceneDetector::new(two_scenes()),
            MockSceneSplitter::new(),
            MemoryStatsSink::new(),
            SplitConfig::default(),
        );
        assert!(workflow.segment(Path::new("/nonexistent/song1.mp4")).unwrap().is_empty());
        assert_eq!(workflow.sink().calls(), 0);
    }
}
