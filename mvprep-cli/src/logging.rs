// ============================================================================
// mvprep-cli/src/logging.rs
// ============================================================================
//
// LOGGING: Logger initialization for the mvprep CLI
//
// Console-only runs use env_logger so RUST_LOG keeps working. With
// `--log-dir` the same records are dispatched through fern to stderr and to a
// timestamped run log file.
//
// KEY COMPONENTS:
// - Timestamp generation for log file names
// - Level selection from --verbose and RUST_LOG
// - Logger installation

use crate::error::{CliErrorContext, CliResult};

use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("mvprep_{}.log", mvprep_cli::logging::get_timestamp());
/// assert!(log_filename.starts_with("mvprep_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Level used when RUST_LOG does not say otherwise.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Path of the run log for a run started now.
pub fn run_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("mvprep_{}.log", get_timestamp()))
}

/// Installs the global logger.
///
/// Returns the run log path when a log directory was given.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let level = default_level(verbose);

    let Some(log_dir) = log_dir else {
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format_timestamp_secs()
            .init();
        return Ok(None);
    };

    fs::create_dir_all(log_dir)
        .cli_with_context(|| format!("Creating log directory {}", log_dir.display()))?;
    let log_path = run_log_path(log_dir);
    let log_file = fern::log_file(&log_path)
        .cli_with_context(|| format!("Opening run log {}", log_path.display()))?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .chain(log_file)
        .apply()
        .map_err(|e| crate::cli_error!("Installing logger: {}", e))?;

    Ok(Some(log_path))
}
