//! Implementation of the 'harmonize' subcommand.
//!
//! Normalizes each video in place and prints `asset: layout`, with an empty
//! layout for videos that could not be classified.

use super::{BatchSummary, FfmpegHarmonizer, discover_inputs, display_name, ffmpeg_harmonizer, require_tools};
use crate::cli::HarmonizeArgs;
use crate::error::CliResult;

use mvprep_core::{CoreConfig, HarmonizeReport, StepOutcome};

use log::{info, warn};
use std::time::Instant;

pub fn run_harmonize(args: HarmonizeArgs, config: CoreConfig) -> CliResult<()> {
    let files = discover_inputs(&args.input_path)?;
    if files.is_empty() {
        warn!("No video files found in {}", args.input_path.display());
        println!("No video files found.");
        return Ok(());
    }
    require_tools()?;

    let engine = ffmpeg_harmonizer(&config);
    let started = Instant::now();
    let mut summary = BatchSummary::default();

    for file in &files {
        let report = harmonize_one(&engine, file);
        record_report(&mut summary, &report);
    }

    info!("Harmonized {} videos in {:.2}s", files.len(), started.elapsed().as_secs_f64());
    summary.finish("harmonize")
}

/// Harmonizes one asset and prints its layout line.
pub(crate) fn harmonize_one(engine: &FfmpegHarmonizer, file: &std::path::Path) -> HarmonizeReport {
    let report = engine.harmonize(file);
    println!("{}: {}", display_name(file), report.layout);
    report
}

pub(crate) fn record_report(summary: &mut BatchSummary, report: &HarmonizeReport) {
    if report.is_complete() {
        summary.record_success();
        return;
    }

    let reason = match &report.classification_error {
        Some(error) => format!("classification failed: {}", error),
        None if !report.layout.is_known() => "could not be classified".to_string(),
        None => report
            .failures()
            .iter()
            .filter_map(|s| match &s.outcome {
                StepOutcome::Failed { error } => Some(format!("{}: {}", s.step, error)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("; "),
    };
    summary.record_failure(&report.asset, reason);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvprep_core::{CanonicalLayout, StepReport};
    use std::path::PathBuf;
    use std::time::Duration;

    fn report(layout: CanonicalLayout, steps: Vec<StepReport>) -> HarmonizeReport {
        HarmonizeReport {
            asset: PathBuf::from("/videos/song.mp4"),
            layout,
            classification_error: None,
            steps,
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_complete_report_counts_as_processed() {
        let mut summary = BatchSummary::default();
        record_report(
            &mut summary,
            &report(
                CanonicalLayout::Widescreen,
                vec![StepReport {
                    step: "scale normalization",
                    outcome: StepOutcome::Applied {
                        rule: "scale",
                        filter: "scale=640:-2".to_string(),
                    },
                }],
            ),
        );
        assert_eq!(summary.processed, 1);
        assert!(summary.failed.is_empty());
    }

    #[test]
    fn test_failed_step_is_reported() {
        let mut summary = BatchSummary::default();
        record_report(
            &mut summary,
            &report(
                CanonicalLayout::UltraWide,
                vec![StepReport {
                    step: "residual bar removal",
                    outcome: StepOutcome::Failed {
                        error: "ffmpeg exited 1".to_string(),
                    },
                }],
            ),
        );
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].1, "residual bar removal: ffmpeg exited 1");
    }

    #[test]
    fn test_unclassified_is_reported() {
        let mut summary = BatchSummary::default();
        record_report(&mut summary, &report(CanonicalLayout::Unknown, Vec::new()));
        assert_eq!(summary.failed[0].1, "could not be classified");
    }
}
