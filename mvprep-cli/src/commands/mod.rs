//! Command implementations for the CLI.
//!
//! Each submodule implements one subcommand; this module holds what they
//! share: input discovery, configuration loading, the ffmpeg-backed
//! collaborators and the batch summary.

pub mod harmonize;
pub mod prepare;
pub mod split;

pub use harmonize::run_harmonize;
pub use prepare::run_prepare;
pub use split::run_split;

use crate::cli::StatsArgs;
use crate::error::{CliErrorContext, CliResult};

use mvprep_core::external::{
    CrateFfprobeExecutor, FfmpegCropDetector, FfmpegSceneDetector, FfmpegSceneSplitter,
    FfmpegTransformer, SidecarSpawner, check_dependency,
};
use mvprep_core::scenes::FileStatsSink;
use mvprep_core::{
    CoreConfig, CoreError, HarmonizationEngine, SceneSplitWorkflow, find_video_assets,
    is_video_asset,
};

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Harmonization engine wired to ffmpeg and ffprobe.
pub type FfmpegHarmonizer = HarmonizationEngine<
    FfmpegCropDetector<SidecarSpawner>,
    CrateFfprobeExecutor,
    FfmpegTransformer<SidecarSpawner>,
>;

/// Scene split workflow wired to ffmpeg, ffprobe and the statistics files.
pub type FfmpegSplitWorkflow = SceneSplitWorkflow<
    FfmpegSceneDetector<SidecarSpawner, CrateFfprobeExecutor>,
    FfmpegSceneSplitter<SidecarSpawner>,
    FileStatsSink,
>;

/// Loads the configuration file (if any), applies environment overrides and
/// validates the result.
pub fn load_config(path: Option<&Path>) -> CliResult<CoreConfig> {
    let config = match path {
        Some(path) => CoreConfig::from_file(path)?,
        None => CoreConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Applies `--length-log` / `--count-log` on top of the loaded configuration.
pub fn apply_stats_overrides(mut config: CoreConfig, stats: &StatsArgs) -> CoreConfig {
    if let Some(path) = &stats.length_log {
        config.stats.scene_length_log = path.clone();
    }
    if let Some(path) = &stats.count_log {
        config.stats.scene_count_log = path.clone();
    }
    config
}

/// Resolves the input argument to the videos to process.
///
/// A directory yields its top-level video assets in name order (possibly
/// none); a file must itself be a video asset.
pub fn discover_inputs(input: &Path) -> CliResult<Vec<PathBuf>> {
    let input_path = input
        .canonicalize()
        .cli_with_context(|| format!("Invalid input path '{}'", input.display()))?;

    let metadata = fs::metadata(&input_path)
        .cli_with_context(|| format!("Failed to access input path '{}'", input_path.display()))?;

    if metadata.is_dir() {
        match find_video_assets(&input_path) {
            Ok(files) => Ok(files),
            Err(CoreError::NoFilesFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    } else if metadata.is_file() {
        if is_video_asset(&input_path) {
            Ok(vec![input_path])
        } else {
            Err(crate::cli_error!(
                "Input file '{}' is not a supported video file",
                input_path.display()
            ))
        }
    } else {
        Err(crate::cli_error!(
            "Input path '{}' is neither a file nor a directory",
            input_path.display()
        ))
    }
}

/// Fails early when ffmpeg or ffprobe is missing.
pub fn require_tools() -> CliResult<()> {
    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")?;
    Ok(())
}

pub fn ffmpeg_harmonizer(config: &CoreConfig) -> FfmpegHarmonizer {
    HarmonizationEngine::new(
        FfmpegCropDetector::new(SidecarSpawner, config.crop_detection.clone()),
        CrateFfprobeExecutor::new(),
        FfmpegTransformer::new(SidecarSpawner),
        config.harmonize.clone(),
    )
}

pub fn ffmpeg_split_workflow(config: &CoreConfig) -> FfmpegSplitWorkflow {
    SceneSplitWorkflow::new(
        FfmpegSceneDetector::new(
            SidecarSpawner,
            CrateFfprobeExecutor::new(),
            config.scene_detection.clone(),
        ),
        FfmpegSceneSplitter::new(SidecarSpawner),
        FileStatsSink::new(&config.stats.scene_length_log, &config.stats.scene_count_log),
        config.split.clone(),
    )
}

/// Display name of an asset in command output.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Tally of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn record_success(&mut self) {
        self.processed += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, asset: &Path, reason: impl Into<String>) {
        self.failed.push((asset.to_path_buf(), reason.into()));
    }

    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed.len()
    }

    /// Prints the summary and turns failures into an error for the exit code.
    pub fn finish(self, command: &str) -> CliResult<()> {
        info!(
            "{} finished: {} processed, {} skipped, {} failed",
            command,
            self.processed,
            self.skipped,
            self.failed.len()
        );
        println!(
            "\n{}: {} processed, {} skipped, {} failed",
            command,
            self.processed,
            self.skipped,
            self.failed.len()
        );
        for (asset, reason) in &self.failed {
            warn!("{}: {}", asset.display(), reason);
            println!("  failed {}: {}", display_name(asset), reason);
        }

        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(crate::cli_error!(
                "{} of {} videos failed",
                self.failed.len(),
                self.total()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_discover_directory_and_file() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("b.mp4")).unwrap();
        File::create(dir.path().join("a.mp4")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let files = discover_inputs(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["a.mp4", "b.mp4"]);

        let single = discover_inputs(&dir.path().join("b.mp4")).unwrap();
        assert_eq!(single.len(), 1);

        assert!(discover_inputs(&dir.path().join("notes.txt")).is_err());
        assert!(discover_inputs(&dir.path().join("missing.mp4")).is_err());
    }

    #[test]
    fn test_empty_directory_has_no_inputs() {
        let dir = tempdir().unwrap();
        assert!(discover_inputs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_stats_overrides() {
        let stats = StatsArgs {
            length_log: Some(PathBuf::from("/tmp/lengths.csv")),
            count_log: None,
        };
        let config = apply_stats_overrides(CoreConfig::default(), &stats);
        assert_eq!(config.stats.scene_length_log, PathBuf::from("/tmp/lengths.csv"));
        assert_eq!(
            config.stats.scene_count_log,
            CoreConfig::default().stats.scene_count_log
        );
    }

    #[test]
    fn test_batch_summary_failures_are_errors() {
        let mut summary = BatchSummary::default();
        summary.record_success();
        summary.record_skip();
        assert_eq!(summary.total(), 2);

        let mut failing = BatchSummary::default();
        failing.record_success();
        failing.record_failure(Path::new("/v/song.mp4"), "crop failed");
        let err = failing.finish("harmonize").unwrap_err();
        assert!(err.to_string().contains("1 of 2 videos failed"));
    }
}
