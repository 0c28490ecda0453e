// mvprep-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for this crate's unit tests and, through the "test-mocks"
// feature, for downstream crates that want the same doubles.

use super::*;
use crate::error::{CoreError, CoreResult};
use crate::geometry::Dimensions;
use crate::plan::{CropPlan, FilterOp};
use crate::scenes::{DetectionCache, Scene};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt; // For ExitStatus::from_raw
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

// ============================================================================
// FFMPEG PROCESS MOCKS
// ============================================================================

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Rc<RefCell<Vec<FfmpegEvent>>>,
    /// Error raised after the events were emitted, if any.
    pub event_error: Option<String>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
    kills: Rc<Cell<usize>>,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.events_to_emit.borrow().clone();
        for event in events {
            handler(event)?;
        }
        match &self.event_error {
            Some(message) => Err(CoreError::OperationFailed(message.clone())),
            None => Ok(()),
        }
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.kills.set(self.kills.get() + 1);
        Ok(())
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
#[derive(Clone)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    kills: Rc<Cell<usize>>,
    available: Rc<Cell<bool>>,
}

impl Default for MockFfmpegSpawner {
    fn default() -> Self {
        Self {
            expectations: Rc::default(),
            received_calls: Rc::default(),
            kills: Rc::default(),
            available: Rc::new(Cell::new(true)),
        }
    }
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    fn process(&self, events: Vec<FfmpegEvent>, exit_code: i32) -> MockFfmpegProcess {
        MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            event_error: None,
            exit_status: ExitStatus::from_raw(exit_code),
            kills: Rc::clone(&self.kills),
        }
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        let process = self.process(events, 0);
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        let process = self.process(events, exit_code);
        self.add_expectation(arg_pattern, Ok(process), false);
    }

    /// The process fails while its events are being read.
    pub fn add_event_error_expectation(&self, arg_pattern: &str, message: &str) {
        let mut process = self.process(Vec::new(), 0);
        process.event_error = Some(message.to_string());
        self.add_expectation(arg_pattern, Ok(process), false);
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    /// Number of `kill` calls across every spawned process.
    pub fn kill_count(&self) -> usize {
        self.kills.get()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .as_inner()
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let mut expectations = self.expectations.borrow_mut();
        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        let Some(index) = found_index else {
            log::error!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
            panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
        };

        let expectation = expectations.remove(index);
        log::info!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        let process = expectation.result?;
        if expectation.create_dummy_output {
            if let Some(output_path) = args.last().map(PathBuf::from) {
                if let Some(parent) = output_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&output_path, b"mock output")?;
                log::info!("MockFfmpegSpawner created dummy output file: {:?}", output_path);
            }
        }
        Ok(process)
    }

    fn is_available(&self) -> bool {
        self.available.get()
    }
}

// ============================================================================
// FFPROBE MOCK
// ============================================================================

/// Mock implementation of FfprobeExecutor.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    video_properties_results: Rc<RefCell<HashMap<PathBuf, VideoProperties>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers the properties reported for `input_path`.
    pub fn expect_video_properties(&self, input_path: &Path, properties: VideoProperties) {
        self.video_properties_results
            .borrow_mut()
            .insert(input_path.to_path_buf(), properties);
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties> {
        self.video_properties_results
            .borrow()
            .get(input_path)
            .cloned()
            .ok_or_else(|| {
                CoreError::VideoInfoError(format!(
                    "MockFfprobeExecutor: No expectation set for path {}",
                    input_path.display()
                ))
            })
    }
}

// ============================================================================
// SIMULATED MEDIA
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct SimulatedVideo {
    resolution: Dimensions,
    content: Dimensions,
}

/// In-memory videos acting as crop detector, resolution probe and
/// transformer at once. Filter plans change the simulated geometry the way
/// ffmpeg would.
#[derive(Clone, Default)]
pub struct SimulatedMedia {
    videos: Rc<RefCell<HashMap<PathBuf, SimulatedVideo>>>,
    applied: Rc<RefCell<Vec<String>>>,
    failures: Rc<RefCell<Vec<String>>>,
    detection_failures: Rc<Cell<usize>>,
}

impl SimulatedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a video with full `resolution` whose picture covers `content`.
    pub fn add_video(&self, path: &Path, resolution: (u32, u32), content: (u32, u32)) {
        let dims = |(w, h): (u32, u32)| {
            Dimensions::new(w, h)
                .unwrap_or_else(|e| panic!("SimulatedMedia: invalid video geometry: {e}"))
        };
        let video = SimulatedVideo {
            resolution: dims(resolution),
            content: dims(content),
        };
        self.videos.borrow_mut().insert(path.to_path_buf(), video);
    }

    /// Every transform whose filter graph contains `pattern` fails.
    pub fn fail_transforms_containing(&self, pattern: &str) {
        self.failures.borrow_mut().push(pattern.to_string());
    }

    /// The next `count` content-box detections fail.
    pub fn fail_next_detections(&self, count: usize) {
        self.detection_failures.set(count);
    }

    /// Filter graphs applied successfully, in order.
    pub fn applied(&self) -> Vec<String> {
        self.applied.borrow().clone()
    }

    pub fn resolution_of(&self, path: &Path) -> Option<Dimensions> {
        self.videos.borrow().get(path).map(|v| v.resolution)
    }

    pub fn content_of(&self, path: &Path) -> Option<Dimensions> {
        self.videos.borrow().get(path).map(|v| v.content)
    }

    fn apply_op(video: SimulatedVideo, op: &FilterOp) -> CoreResult<SimulatedVideo> {
        let SimulatedVideo {
            resolution: res,
            content,
        } = video;
        match *op {
            FilterOp::Crop { width, height } => {
                if width > res.width() || height > res.height() {
                    return Err(CoreError::OperationFailed(format!(
                        "crop {width}x{height} exceeds {res}"
                    )));
                }
                Ok(SimulatedVideo {
                    resolution: Dimensions::new(width, height)?,
                    content: Dimensions::new(
                        content.width().min(width),
                        content.height().min(height),
                    )?,
                })
            }
            FilterOp::Scale { width, height } => {
                let factor = f64::from(width) / f64::from(res.width());
                let scaled_height = if height < 0 {
                    let step = height.unsigned_abs();
                    let exact = f64::from(res.height()) * factor / f64::from(step);
                    (exact.round() as u32).max(1) * step
                } else {
                    height as u32
                };
                let scale = |v: u32| ((f64::from(v) * factor).round() as u32).max(1);
                Ok(SimulatedVideo {
                    resolution: Dimensions::new(width, scaled_height)?,
                    content: Dimensions::new(
                        scale(content.width()).min(width),
                        scale(content.height()).min(scaled_height),
                    )?,
                })
            }
            FilterOp::Pad { width, height } => {
                if width < res.width() || height < res.height() {
                    return Err(CoreError::OperationFailed(format!(
                        "pad {width}x{height} smaller than {res}"
                    )));
                }
                Ok(SimulatedVideo {
                    resolution: Dimensions::new(width, height)?,
                    content,
                })
            }
        }
    }
}

impl CropDetector for SimulatedMedia {
    fn detect_content_box(&self, video: &Path) -> CoreResult<Option<Dimensions>> {
        let pending = self.detection_failures.get();
        if pending > 0 {
            self.detection_failures.set(pending - 1);
            return Err(CoreError::NoCropDetected(video.display().to_string()));
        }
        Ok(self.content_of(video))
    }
}

impl ResolutionProbe for SimulatedMedia {
    fn resolution(&self, video: &Path) -> CoreResult<Option<Dimensions>> {
        Ok(self.resolution_of(video))
    }
}

impl VideoTransformer for SimulatedMedia {
    fn apply(&self, video: &Path, plan: &CropPlan) -> CoreResult<()> {
        if plan.is_empty() {
            return Ok(());
        }
        let graph = plan.filter_graph();
        if self.failures.borrow().iter().any(|p| graph.contains(p.as_str())) {
            return Err(CoreError::OperationFailed(format!("simulated failure for '{graph}'")));
        }

        let mut videos = self.videos.borrow_mut();
        let current = *videos.get(video).ok_or_else(|| {
            CoreError::PathError(format!("Cannot transform missing file {}", video.display()))
        })?;
        let updated = plan
            .ops()
            .iter()
            .try_fold(current, |state, op| Self::apply_op(state, op))?;
        videos.insert(video.to_path_buf(), updated);
        self.applied.borrow_mut().push(graph);
        Ok(())
    }
}

// ============================================================================
// SCENE MOCKS
// ============================================================================

/// Scene detector returning fixed scenes and counting handle usage.
#[derive(Clone, Default)]
pub struct MockSceneDetector {
    scenes: Rc<RefCell<Vec<Scene>>>,
    fail_detection: Rc<Cell<bool>>,
    opens: Rc<Cell<usize>>,
    releases: Rc<Cell<usize>>,
    cache_hits: Rc<Cell<usize>>,
}

impl MockSceneDetector {
    pub fn new(scenes: Vec<Scene>) -> Self {
        let detector = Self::default();
        *detector.scenes.borrow_mut() = scenes;
        detector
    }

    pub fn fail_detection(&self) {
        self.fail_detection.set(true);
    }

    pub fn opens(&self) -> usize {
        self.opens.get()
    }

    pub fn releases(&self) -> usize {
        self.releases.get()
    }

    /// Detections that found reusable scores in the cache.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits.get()
    }
}

pub struct MockFrameSource {
    detector: MockSceneDetector,
    released: bool,
}

impl FrameSource for MockFrameSource {
    fn detect_scenes(&mut self, cache: &mut DetectionCache) -> CoreResult<Vec<Scene>> {
        if self.detector.fail_detection.get() {
            return Err(CoreError::OperationFailed("simulated detection failure".to_string()));
        }
        if cache.is_usable(1) {
            self.detector.cache_hits.set(self.detector.cache_hits.get() + 1);
        } else {
            let scenes = self.detector.scenes.borrow();
            let frames = scenes.last().map_or(0, |s| s.end().frame());
            let fps = scenes.first().map_or(25.0, |s| s.start().fps());
            cache.replace(fps, 1, vec![0.0; frames as usize]);
        }
        Ok(self.detector.scenes.borrow().clone())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.detector.releases.set(self.detector.releases.get() + 1);
        }
    }
}

impl SceneDetector for MockSceneDetector {
    type Source = MockFrameSource;

    fn open(&self, _video: &Path) -> CoreResult<Self::Source> {
        self.opens.set(self.opens.get() + 1);
        Ok(MockFrameSource {
            detector: self.clone(),
            released: false,
        })
    }
}

/// Scene splitter writing empty files instead of encoding.
#[derive(Clone)]
pub struct MockSceneSplitter {
    available: Rc<Cell<bool>>,
    calls: Rc<Cell<usize>>,
}

impl Default for MockSceneSplitter {
    fn default() -> Self {
        Self {
            available: Rc::new(Cell::new(true)),
            calls: Rc::default(),
        }
    }
}

impl MockSceneSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        let splitter = Self::default();
        splitter.available.set(false);
        splitter
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl SceneSplitter for MockSceneSplitter {
    fn is_available(&self) -> bool {
        self.available.get()
    }

    fn split(
        &self,
        _video: &Path,
        scenes: &[Scene],
        request: &SplitRequest,
    ) -> CoreResult<Vec<PathBuf>> {
        self.calls.set(self.calls.get() + 1);
        (1..=scenes.len())
            .map(|number| {
                let path = request.scene_path(number);
                std::fs::write(&path, b"scene")?;
                Ok(path)
            })
            .collect()
    }
}
