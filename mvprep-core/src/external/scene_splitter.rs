//! Scene extraction with one ffmpeg run per scene.

use super::{FfmpegSpawner, SceneSplitter, run_to_completion};
use crate::config::SplitConfig;
use crate::error::CoreResult;
use crate::scenes::{Scene, SplitTemplate};
use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::{Path, PathBuf};

/// Where and how scene files are written.
#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub output_dir: PathBuf,
    pub video_name: String,
    pub template: SplitTemplate,
    pub suppress_output: bool,
    pub encoder_args: Vec<String>,
}

impl SplitRequest {
    /// Builds a request from the split configuration.
    pub fn from_config(
        output_dir: impl Into<PathBuf>,
        video_name: impl Into<String>,
        config: &SplitConfig,
    ) -> CoreResult<Self> {
        Ok(Self {
            output_dir: output_dir.into(),
            video_name: video_name.into(),
            template: SplitTemplate::new(config.template.clone())?,
            suppress_output: config.suppress_output,
            encoder_args: config.encoder_args.clone(),
        })
    }

    /// Output path of scene `number` (1-based).
    #[must_use]
    pub fn scene_path(&self, number: usize) -> PathBuf {
        self.output_dir
            .join(self.template.render(&self.video_name, number))
    }
}

/// [`SceneSplitter`] re-encoding each scene with ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegSceneSplitter<S: FfmpegSpawner> {
    spawner: S,
}

impl<S: FfmpegSpawner> FfmpegSceneSplitter<S> {
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }

    fn build_command(video: &Path, scene: &Scene, request: &SplitRequest, output: &Path) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new();
        cmd.args(["-y"]);
        if request.suppress_output {
            cmd.args(["-hide_banner", "-loglevel", "error", "-nostats"]);
        }
        cmd.args(["-ss", &format!("{:.6}", scene.start().seconds())]);
        cmd.input(video.to_string_lossy().as_ref());
        cmd.args(["-t", &format!("{:.6}", scene.duration_secs())]);
        cmd.args(["-map", "0"]);
        cmd.args(&request.encoder_args);
        cmd.args(["-sn"]);
        cmd.output(output.to_string_lossy().as_ref());
        cmd
    }
}

impl<S: FfmpegSpawner> SceneSplitter for FfmpegSceneSplitter<S> {
    fn is_available(&self) -> bool {
        self.spawner.is_available()
    }

    fn split(
        &self,
        video: &Path,
        scenes: &[Scene],
        request: &SplitRequest,
    ) -> CoreResult<Vec<PathBuf>> {
        let mut files = Vec::with_capacity(scenes.len());
        for (index, scene) in scenes.iter().enumerate() {
            let output = request.scene_path(index + 1);
            let cmd = Self::build_command(video, scene, request, &output);
            let result = run_to_completion(&self.spawner, cmd, "split")?;
            if !request.suppress_output {
                for line in &result.log_lines {
                    log::info!("{line}");
                }
            }
            log::debug!(
                "Scene {} ({} - {}) written to {}",
                index + 1,
                scene.start(),
                scene.end(),
                output.display()
            );
            files.push(output);
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockFfmpegSpawner;

    #[test]
    fn test_split_runs_one_command_per_scene() {
        let dir = tempfile::tempdir().unwrap();
        let request =
            SplitRequest::from_config(dir.path().join("song1"), "song1", &SplitConfig::default())
                .unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("song1-Scene-001.mp4", vec![], true);
        spawner.add_success_expectation("song1-Scene-002.mp4", vec![], true);
        let splitter = FfmpegSceneSplitter::new(spawner.clone());

        let scenes = [
            Scene::from_frames(0, 100, 25.0),
            Scene::from_frames(100, 250, 25.0),
        ];
        let files = splitter
            .split(Path::new("song1.mp4"), &scenes, &request)
            .unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("song1/song1-Scene-001.mp4"),
                dir.path().join("song1/song1-Scene-002.mp4"),
            ]
        );
        assert!(files.iter().all(|f| f.exists()));

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 2);
        let second = calls[1].join(" ");
        assert!(second.contains("-ss 4.000000"));
        assert!(second.contains("-t 6.000000"));
        assert!(second.contains("-loglevel error"));
        assert!(second.contains("-c:v libx264"));
    }

    #[test]
    fn test_split_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let request =
            SplitRequest::from_config(dir.path().join("song1"), "song1", &SplitConfig::default())
                .unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation("song1-Scene-001.mp4", vec![], 1);
        let splitter = FfmpegSceneSplitter::new(spawner.clone());

        let scenes = [
            Scene::from_frames(0, 100, 25.0),
            Scene::from_frames(100, 250, 25.0),
        ];
        assert!(splitter.split(Path::new("song1.mp4"), &scenes, &request).is_err());
        assert_eq!(spawner.get_received_calls().len(), 1);
    }
}
