//! Implementation of the 'prepare' subcommand: harmonize, then split.
//!
//! The two stages are independent: a video that could not be harmonized is
//! reported as failed and still goes through the split workflow.

use super::harmonize::{harmonize_one, record_report};
use super::split::split_one;
use super::{
    BatchSummary, apply_stats_overrides, discover_inputs, ffmpeg_harmonizer,
    ffmpeg_split_workflow,
};
use crate::cli::PrepareArgs;
use crate::error::CliResult;

use mvprep_core::CoreConfig;

use log::{info, warn};
use std::time::Instant;

pub fn run_prepare(args: PrepareArgs, config: CoreConfig) -> CliResult<()> {
    let config = apply_stats_overrides(config, &args.stats);

    let files = discover_inputs(&args.input_path)?;
    if files.is_empty() {
        warn!("No video files found in {}", args.input_path.display());
        println!("No video files found.");
        return Ok(());
    }

    let engine = ffmpeg_harmonizer(&config);
    let mut workflow = ffmpeg_split_workflow(&config);
    let mut harmonized = BatchSummary::default();
    let mut split = BatchSummary::default();

    for file in &files {
        let started = Instant::now();
        let report = harmonize_one(&engine, file);
        record_report(&mut harmonized, &report);
        split_one(&mut workflow, file, &mut split);
        info!(
            "Prepared {} in {:.2}s",
            file.display(),
            started.elapsed().as_secs_f64()
        );
    }

    let harmonize_result = harmonized.finish("harmonize");
    let split_result = split.finish("split");
    harmonize_result.and(split_result)
}
