//! Content-box detection through ffmpeg's `cropdetect` filter.
//!
//! ffmpeg prints one `crop=W:H:X:Y` suggestion per analysed frame; the most
//! frequent suggestion is taken as the content box.

use super::{CropDetector, FfmpegSpawner, run_to_completion};
use crate::config::CropDetectionConfig;
use crate::error::{CoreError, CoreResult};
use crate::geometry::Dimensions;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::collections::HashMap;
use std::path::Path;

/// [`CropDetector`] backed by an ffmpeg `cropdetect` pass.
#[derive(Debug, Clone)]
pub struct FfmpegCropDetector<S: FfmpegSpawner> {
    spawner: S,
    config: CropDetectionConfig,
}

impl<S: FfmpegSpawner> FfmpegCropDetector<S> {
    pub fn new(spawner: S, config: CropDetectionConfig) -> Self {
        Self { spawner, config }
    }

    fn build_command(&self, video: &Path) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new();
        cmd.input(video.to_string_lossy().as_ref());
        cmd.args(["-vf", &self.config.filter()]);
        cmd.args(["-ss", &self.config.skip_secs.to_string()]);
        cmd.args(["-vframes", &self.config.sample_frames.to_string()]);
        cmd.args(["-y", "-f", "null", "-"]);
        cmd
    }
}

impl<S: FfmpegSpawner> CropDetector for FfmpegCropDetector<S> {
    fn detect_content_box(&self, video: &Path) -> CoreResult<Option<Dimensions>> {
        if !video.is_file() {
            log::debug!("Skipping crop detection, {} is missing", video.display());
            return Ok(None);
        }

        let output = run_to_completion(&self.spawner, self.build_command(video), "cropdetect")?;
        let crop = parse_crop_from_output(output.log_lines.iter().map(String::as_str))
            .ok_or_else(|| CoreError::NoCropDetected(video.display().to_string()))?;

        log::debug!("Detected content box for {}: {}", video.display(), crop);
        Ok(Some(crop))
    }
}

/// Returns the most frequent `crop=W:H:X:Y` suggestion in `lines`.
///
/// Ties go to the value seen first. Suggestions with a zero or negative
/// size (cropdetect's answer for all-black frames) are ignored.
pub fn parse_crop_from_output<'a, I>(lines: I) -> Option<Dimensions>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<Dimensions, (usize, usize)> = HashMap::new();
    let mut seen = 0usize;

    for line in lines {
        let Some(pos) = line.find("crop=") else {
            continue;
        };
        let value = &line[pos + 5..];
        let end = value.find(char::is_whitespace).unwrap_or(value.len());
        let Some(dims) = parse_crop_value(&value[..end]) else {
            continue;
        };
        let entry = counts.entry(dims).or_insert((0, seen));
        entry.0 += 1;
        seen += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(dims, _)| dims)
}

fn parse_crop_value(crop: &str) -> Option<Dimensions> {
    if !is_valid_crop_format(crop) {
        return None;
    }
    let mut parts = crop.split(':').map(|p| p.parse::<u32>().ok());
    let width = parts.next()??;
    let height = parts.next()??;
    Dimensions::new(width, height).ok()
}

/// Validates that a crop string is `w:h:x:y` with unsigned integers.
fn is_valid_crop_format(crop: &str) -> bool {
    let parts: Vec<&str> = crop.split(':').collect();
    parts.len() == 4 && parts.iter().all(|part| part.parse::<u32>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockFfmpegSpawner;
    use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h).unwrap()
    }

    #[test]
    fn test_is_valid_crop_format() {
        assert!(is_valid_crop_format("1920:1080:0:0"));
        assert!(is_valid_crop_format("1920:800:0:140"));

        assert!(!is_valid_crop_format("1920:1080:0"));
        assert!(!is_valid_crop_format("1920:1080:0:0:0"));
        assert!(!is_valid_crop_format(""));
        assert!(!is_valid_crop_format("width:height:x:y"));
        assert!(!is_valid_crop_format("1920:1080:0:-10"));
        assert!(!is_valid_crop_format("1920.5:1080:0:0"));
    }

    #[test]
    fn test_parse_crop_from_output() {
        let single = ["[Parsed_cropdetect_0 @ 0x7f8] x1:0 x2:1919 y1:140 y2:939 w:1920 h:800 x:0 y:140 pts:0 t:0.000000 crop=1920:800:0:140"];
        assert_eq!(parse_crop_from_output(single), Some(dims(1920, 800)));

        let mixed = [
            "[Parsed_cropdetect_0 @ 0x7f8] crop=1920:800:0:140",
            "[Parsed_cropdetect_0 @ 0x7f8] crop=1920:1080:0:0",
            "[Parsed_cropdetect_0 @ 0x7f8] crop=1920:800:0:140 pts:1234 t:1.234",
        ];
        assert_eq!(parse_crop_from_output(mixed), Some(dims(1920, 800)));

        let noise = [
            "[Parsed_cropdetect_0 @ 0x7f8] crop=invalid:format",
            "[Parsed_cropdetect_0 @ 0x7f8] crop=-1920:-1072:1920:1080",
            "Some other ffmpeg output without crop",
        ];
        assert_eq!(parse_crop_from_output(noise), None);
        assert_eq!(parse_crop_from_output(std::iter::empty()), None);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let lines = [
            "crop=1280:528:0:96",
            "crop=1280:720:0:0",
            "crop=1280:720:0:0",
            "crop=1280:528:0:96",
        ];
        assert_eq!(parse_crop_from_output(lines), Some(dims(1280, 528)));
    }

    #[test]
    fn test_detect_runs_cropdetect_with_sampling_window() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"video").unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation(
            "cropdetect=24:16:0",
            vec![
                FfmpegEvent::Log(LogLevel::Info, "crop=1280:544:0:88".to_string()),
                FfmpegEvent::Log(LogLevel::Info, "crop=1280:544:0:88".to_string()),
            ],
            false,
        );
        let detector = FfmpegCropDetector::new(spawner.clone(), CropDetectionConfig::default());

        let content = detector.detect_content_box(&video).unwrap();
        assert_eq!(content, Some(dims(1280, 544)));

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 1);
        let args = calls[0].join(" ");
        assert!(args.contains("-ss 10"));
        assert!(args.contains("-vframes 1000"));
        assert!(args.ends_with("-f null -"));
        let input = calls[0].iter().position(|a| a == "-i").unwrap();
        assert_eq!(calls[0][input + 1], video.to_string_lossy());
    }

    #[test]
    fn test_detect_missing_file_is_none() {
        let spawner = MockFfmpegSpawner::new();
        let detector = FfmpegCropDetector::new(spawner.clone(), CropDetectionConfig::default());
        let result = detector.detect_content_box(Path::new("/nonexistent/clip.mp4"));
        assert!(matches!(result, Ok(None)));
        assert!(spawner.get_received_calls().is_empty());
    }

    #[test]
    fn test_detect_without_suggestions_errors() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"video").unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("cropdetect", vec![], false);
        let detector = FfmpegCropDetector::new(spawner, CropDetectionConfig::default());

        let result = detector.detect_content_box(&video);
        assert!(matches!(result, Err(CoreError::NoCropDetected(_))));
    }
}
