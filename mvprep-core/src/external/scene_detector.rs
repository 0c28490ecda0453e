// ============================================================================
// mvprep-core/src/external/scene_detector.rs
// ============================================================================
//
// SCENE DETECTOR: Per-frame Content Difference Scores from ffmpeg
//
// ffmpeg's `select` filter computes a 0..1 scene-change score for every
// frame; `metadata=print` logs it. The video is downscaled first, which is
// what makes a full pass over a music video affordable. Scores are cached per
// asset so later runs skip the decode entirely.
//
// KEY COMPONENTS:
// - FfmpegSceneDetector: opens frame sources after probing the stream
// - FfmpegFrameSource: owns the running ffmpeg process while scoring
// - parse_scene_scores: metadata log lines -> per-frame score vector

use super::{FfmpegProcess, FfmpegSpawner, FfprobeExecutor, FrameSource, SceneDetector};
use super::ffprobe_executor::VideoProperties;
use crate::config::SceneDetectionConfig;
use crate::error::{CoreResult, command_failed_error};
use crate::scenes::{DetectionCache, Scene, scenes_from_scores};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::path::{Path, PathBuf};

const SCENE_SCORE_KEY: &str = "lavfi.scene_score=";

/// [`SceneDetector`] scoring frames with ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegSceneDetector<S, P> {
    spawner: S,
    probe: P,
    config: SceneDetectionConfig,
}

impl<S, P> FfmpegSceneDetector<S, P>
where
    S: FfmpegSpawner + Clone,
    P: FfprobeExecutor,
{
    pub fn new(spawner: S, probe: P, config: SceneDetectionConfig) -> Self {
        Self {
            spawner,
            probe,
            config,
        }
    }
}

impl<S, P> SceneDetector for FfmpegSceneDetector<S, P>
where
    S: FfmpegSpawner + Clone,
    P: FfprobeExecutor,
{
    type Source = FfmpegFrameSource<S>;

    fn open(&self, video: &Path) -> CoreResult<Self::Source> {
        let properties = self.probe.get_video_properties(video)?;
        log::debug!(
            "Opened {} for scene detection: {}x{} @ {:.3} fps",
            video.display(),
            properties.width,
            properties.height,
            properties.frame_rate
        );
        Ok(FfmpegFrameSource {
            video: video.to_path_buf(),
            properties,
            config: self.config.clone(),
            spawner: self.spawner.clone(),
            process: None,
        })
    }
}

/// Frame access for one asset; holds the decoding process while it runs.
pub struct FfmpegFrameSource<S: FfmpegSpawner> {
    video: PathBuf,
    properties: VideoProperties,
    config: SceneDetectionConfig,
    spawner: S,
    process: Option<S::Process>,
}

impl<S: FfmpegSpawner> FfmpegFrameSource<S> {
    #[must_use]
    pub fn properties(&self) -> &VideoProperties {
        &self.properties
    }

    fn compute_scores(&mut self, downscale: u32) -> CoreResult<Vec<f64>> {
        let mut cmd = FfmpegCommand::new();
        cmd.input(self.video.to_string_lossy().as_ref());
        cmd.args([
            "-vf",
            &format!("scale=iw/{downscale}:-2,select='gte(scene,0)',metadata=print"),
        ]);
        cmd.args(["-an", "-sn", "-f", "null", "-"]);
        log::debug!("Scoring frames of {}: {:?}", self.video.display(), cmd);

        let process = self.process.insert(self.spawner.spawn(cmd)?);
        let mut lines = Vec::new();
        process.handle_events(|event| {
            if let FfmpegEvent::Log(_, line) = event {
                lines.push(line);
            }
            Ok(())
        })?;
        let status = process.wait()?;
        self.process = None;

        if !status.success() {
            return Err(command_failed_error(
                "ffmpeg (scene scores)",
                status,
                format!("scene scoring of {} failed", self.video.display()),
            ));
        }
        Ok(parse_scene_scores(lines.iter().map(String::as_str)))
    }
}

impl<S: FfmpegSpawner> FrameSource for FfmpegFrameSource<S> {
    fn detect_scenes(&mut self, cache: &mut DetectionCache) -> CoreResult<Vec<Scene>> {
        let downscale = self.config.downscale_for(self.properties.width);

        if cache.is_usable(downscale) {
            log::info!(
                "Reusing {} cached frame scores for {}",
                cache.scores().len(),
                self.video.display()
            );
        } else {
            let scores = self.compute_scores(downscale)?;
            log::debug!("Computed {} frame scores (downscale {})", scores.len(), downscale);
            cache.replace(self.properties.frame_rate, downscale, scores);
        }

        Ok(scenes_from_scores(
            cache.scores(),
            cache.fps(),
            self.config.threshold,
            self.config.min_scene_len,
        ))
    }

    fn release(&mut self) {
        if let Some(mut process) = self.process.take() {
            log::debug!("Stopping frame decoding for {}", self.video.display());
            if let Err(e) = process.kill() {
                log::warn!("Failed to stop ffmpeg: {}", e);
            }
            let _ = process.wait();
        }
    }
}

/// Collects per-frame scene scores from `metadata=print` log lines.
///
/// Each frame is announced by a `frame:N` line followed by its
/// `lavfi.scene_score=` line. Frames without a score count as 0.
pub fn parse_scene_scores<'a, I>(lines: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scores: Vec<f64> = Vec::new();
    let mut current: Option<usize> = None;

    for line in lines {
        if let Some(frame) = parse_frame_number(line) {
            if scores.len() <= frame {
                scores.resize(frame + 1, 0.0);
            }
            current = Some(frame);
        } else if let Some(pos) = line.find(SCENE_SCORE_KEY) {
            let value = line[pos + SCENE_SCORE_KEY.len()..].trim();
            if let (Some(frame), Ok(score)) = (current, value.parse::<f64>()) {
                scores[frame] = score;
            }
        }
    }
    scores
}

fn parse_frame_number(line: &str) -> Option<usize> {
    let pos = line.find("frame:")?;
    let rest = &line[pos + "frame:".len()..];
    let digits: &str = rest
        .trim_start()
        .split(|c: char| !c.is_ascii_digit())
        .next()?;
    if !line.contains("pts:") {
        return None;
    }
    digits.parse().ok()
}
