//! Implementation of the 'split' subcommand.
//!
//! Runs the scene split workflow for each video. Videos whose scene folder
//! already exists are skipped without touching the statistics logs, and
//! without ffmpeg every video is skipped with a warning.

use super::{
    BatchSummary, FfmpegSplitWorkflow, apply_stats_overrides, discover_inputs, display_name,
    ffmpeg_split_workflow,
};
use crate::cli::SplitArgs;
use crate::error::CliResult;

use mvprep_core::{CoreConfig, SegmentOutcome};

use log::warn;
use std::path::Path;

pub fn run_split(args: SplitArgs, config: CoreConfig) -> CliResult<()> {
    let mut config = apply_stats_overrides(config, &args.stats);
    if args.show_split_output {
        config.split.suppress_output = false;
    }

    let files = discover_inputs(&args.input_path)?;
    if files.is_empty() {
        warn!("No video files found in {}", args.input_path.display());
        println!("No video files found.");
        return Ok(());
    }

    // A missing ffmpeg is reported per video by the workflow.
    let mut workflow = ffmpeg_split_workflow(&config);
    let mut summary = BatchSummary::default();
    for file in &files {
        split_one(&mut workflow, file, &mut summary);
    }
    summary.finish("split")
}

/// Segments one asset, prints what happened and records it.
pub(crate) fn split_one(workflow: &mut FfmpegSplitWorkflow, file: &Path, summary: &mut BatchSummary) {
    let outcome = workflow.run(file);
    record_outcome(summary, file, outcome);
}

pub(crate) fn record_outcome(
    summary: &mut BatchSummary,
    file: &Path,
    outcome: mvprep_core::CoreResult<SegmentOutcome>,
) {
    let name = display_name(file);
    match outcome {
        Ok(SegmentOutcome::Segmented { scenes, .. }) => {
            println!("{}: {} scenes", name, scenes.len());
            summary.record_success();
        }
        Ok(SegmentOutcome::AlreadySegmented) => {
            println!("{}: already split", name);
            summary.record_skip();
        }
        Ok(SegmentOutcome::NoScenes) => {
            println!("{}: no scenes detected", name);
            summary.record_skip();
        }
        Ok(SegmentOutcome::SplitterUnavailable) => {
            println!("{}: ffmpeg unavailable, not split", name);
            summary.record_skip();
        }
        Ok(SegmentOutcome::MissingSource) => {
            summary.record_failure(file, "video file is missing");
        }
        Err(e) => {
            summary.record_failure(file, e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvprep_core::{CoreError, Scene};
    use std::path::PathBuf;

    #[test]
    fn test_outcomes_are_tallied() {
        let file = Path::new("/videos/song1.mp4");
        let mut summary = BatchSummary::default();

        record_outcome(
            &mut summary,
            file,
            Ok(SegmentOutcome::Segmented {
                scenes: vec![Scene::from_frames(0, 50, 25.0)],
                files: vec![PathBuf::from("/videos/song1/song1-Scene-001.mp4")],
            }),
        );
        record_outcome(&mut summary, file, Ok(SegmentOutcome::AlreadySegmented));
        record_outcome(&mut summary, file, Ok(SegmentOutcome::NoScenes));
        record_outcome(&mut summary, file, Ok(SegmentOutcome::SplitterUnavailable));
        record_outcome(&mut summary, file, Ok(SegmentOutcome::MissingSource));
        record_outcome(
            &mut summary,
            file,
            Err(CoreError::OperationFailed("split failed".to_string())),
        );

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.failed.len(), 2);
        assert_eq!(summary.failed[1].1, "Operation failed: split failed");
    }
}
