// mvprep-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "mvprep: Music-video preparation tool",
    long_about = "Harmonizes music videos to 16:9 or 40:17 at 640x360 and splits them into scenes using ffmpeg via mvprep-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug output, including every ffmpeg command line
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// TOML configuration file; MVPREP_* environment variables override it
    #[arg(short, long, global = true, value_name = "FILE", env = "MVPREP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write a timestamped run log into this directory
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalizes each video to a canonical layout in place
    Harmonize(HarmonizeArgs),
    /// Splits each video into per-scene files, skipping videos already split
    Split(SplitArgs),
    /// Harmonizes and then splits each video
    Prepare(PrepareArgs),
}

#[derive(Args, Debug)]
pub struct HarmonizeArgs {
    /// Video file or directory of .mp4 files
    #[arg(required = true, value_name = "INPUT_PATH")]
    pub input_path: PathBuf,
}

/// Overrides for the shared statistics logs.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    /// Scene length log (one `asset,frames,seconds` line per scene)
    #[arg(long, value_name = "FILE")]
    pub length_log: Option<PathBuf>,

    /// Scene count log (one `asset,count` line per split video)
    #[arg(long, value_name = "FILE")]
    pub count_log: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Video file or directory of .mp4 files
    #[arg(required = true, value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    #[command(flatten)]
    pub stats: StatsArgs,

    /// Show ffmpeg output while splitting
    #[arg(long, default_value_t = false)]
    pub show_split_output: bool,
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Video file or directory of .mp4 files
    #[arg(required = true, value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    #[command(flatten)]
    pub stats: StatsArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_split_args() {
        let cli = Cli::parse_from([
            "mvprep",
            "--verbose",
            "split",
            "videos",
            "--length-log",
            "lengths.csv",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Split(args) => {
                assert_eq!(args.input_path, PathBuf::from("videos"));
                assert_eq!(args.stats.length_log, Some(PathBuf::from("lengths.csv")));
                assert_eq!(args.stats.count_log, None);
                assert!(!args.show_split_output);
            }
            other => panic!("Expected split command, got {:?}", other),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["mvprep", "harmonize", "song.mp4", "--log-dir", "logs"]);

        assert_eq!(cli.log_dir, Some(PathBuf::from("logs")));
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Harmonize(_)));
    }

    #[test]
    fn test_missing_input_is_rejected() {
        assert!(Cli::try_parse_from(["mvprep", "prepare"]).is_err());
    }
}
