//! Error types for the mvprep-core library.
//!
//! Every fallible operation in the crate returns [`CoreResult`]. External
//! command failures are built through the `command_*_error` helpers so the
//! command name, exit status and captured stderr travel together.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, io::Error),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, io::Error),

    #[error("Command '{command}' failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Required dependency '{0}' was not found")]
    DependencyNotFound(String),

    #[error("ffprobe output could not be parsed: {0}")]
    FfprobeParse(String),

    #[error("Video information error: {0}")]
    VideoInfoError(String),

    #[error("Invalid dimensions '{0}'")]
    InvalidDimensions(String),

    #[error("Crop detection found no crop values for {0}")]
    NoCropDetected(String),

    #[error("Detection cache error: {0}")]
    DetectionCache(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No video files found")]
    NoFilesFound,

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for a command that could not be spawned.
pub fn command_start_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), err)
}

/// Builds a [`CoreError::CommandWait`] for a command whose exit could not be collected.
pub fn command_wait_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), err)
}

/// Builds a [`CoreError::CommandFailed`] for a command that exited unsuccessfully.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}
