//! FFprobe integration for stream geometry and timing.
//!
//! Provides the [`ResolutionProbe`] used by harmonization and the video
//! properties (frame rate, width) scene detection needs to turn frame
//! numbers into timecodes.

use super::ResolutionProbe;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::geometry::Dimensions;
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Properties of the first video stream of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    pub duration_secs: Option<f64>,
    /// Frames per second, from the stream's `r_frame_rate`.
    pub frame_rate: f64,
}

impl VideoProperties {
    #[must_use]
    pub fn dimensions(&self) -> Option<Dimensions> {
        Dimensions::new(self.width, self.height).ok()
    }
}

/// Trait for executing ffprobe queries.
pub trait FfprobeExecutor {
    /// Gets the properties of the first video stream.
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties>;
}

/// Concrete implementation of `FfprobeExecutor` using the ffprobe crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties> {
        get_video_properties(input_path)
    }
}

impl ResolutionProbe for CrateFfprobeExecutor {
    fn resolution(&self, video: &Path) -> CoreResult<Option<Dimensions>> {
        if !video.is_file() {
            return Ok(None);
        }
        let props = self.get_video_properties(video)?;
        let dims = Dimensions::new(props.width, props.height)?;
        log::debug!("Resolution of {}: {}", video.display(), dims);
        Ok(Some(dims))
    }
}

/// Gets video properties for a given input file.
pub fn get_video_properties(input_path: &Path) -> CoreResult<VideoProperties> {
    log::debug!(
        "Running ffprobe (via crate) for video properties on: {}",
        input_path.display()
    );
    let metadata = ffprobe(input_path).map_err(|err| {
        log::error!(
            "ffprobe failed for video properties on {}: {:?}",
            input_path.display(),
            err
        );
        map_ffprobe_error(err, "video properties")
    })?;

    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            CoreError::VideoInfoError(format!(
                "No video stream found in {}",
                input_path.display()
            ))
        })?;

    let (width, height) = match (video_stream.width, video_stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w as u32, h as u32),
        (w, h) => {
            return Err(CoreError::VideoInfoError(format!(
                "Invalid dimensions in {}: width={:?}, height={:?}",
                input_path.display(),
                w,
                h
            )));
        }
    };

    let frame_rate = parse_frame_rate(&video_stream.r_frame_rate)
        .or_else(|| parse_frame_rate(&video_stream.avg_frame_rate))
        .ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "Unusable frame rate '{}' in {}",
                video_stream.r_frame_rate,
                input_path.display()
            ))
        })?;

    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok());

    Ok(VideoProperties {
        width,
        height,
        duration_secs,
        frame_rate,
    })
}

/// Gets the container duration in seconds, `None` if the file is missing.
pub fn get_duration(input_path: &Path) -> CoreResult<Option<f64>> {
    if !input_path.is_file() {
        return Ok(None);
    }
    let metadata = ffprobe(input_path).map_err(|err| map_ffprobe_error(err, "duration"))?;
    metadata
        .format
        .duration
        .as_deref()
        .map(|d| {
            d.parse::<f64>().map_err(|e| {
                CoreError::FfprobeParse(format!("Failed to parse duration '{d}': {e}"))
            })
        })
        .transpose()
}

/// Parses ffprobe's `num/den` rate notation (or a plain number).
#[must_use]
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse::<f64>().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::FfprobeParse(format!("ffprobe {context} output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}
