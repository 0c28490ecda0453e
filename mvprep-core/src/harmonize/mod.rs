// ============================================================================
// mvprep-core/src/harmonize/mod.rs
// ============================================================================
//
// HARMONIZATION ENGINE: Bringing a Video to a Canonical Layout
//
// The engine classifies a video once from its detected content box, then
// runs the ordered harmonization steps. Each step re-probes what it needs,
// picks the first matching rule and applies the resulting plan in place.
// Steps are not transactional: a failed step is reported and the next step
// runs on whatever the file looks like after that failure.
//
// KEY COMPONENTS:
// - HarmonizationEngine: drives classification and the step list
// - HarmonizeReport / StepOutcome: what happened to each step

pub mod rules;

pub use rules::{
    HarmonizeStep, Measurement, RuleContext, TransformRule, default_steps, ratio_in_layout_band,
};

use crate::config::HarmonizeConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{CropDetector, ResolutionProbe, VideoTransformer};
use crate::geometry::Dimensions;
use crate::layout::CanonicalLayout;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Result of one harmonization step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// No rule applied, or the rule produced an empty plan.
    Skipped,
    Applied { rule: &'static str, filter: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: &'static str,
    pub outcome: StepOutcome,
}

/// Everything `harmonize` did to one asset.
#[derive(Debug, Clone)]
pub struct HarmonizeReport {
    pub asset: PathBuf,
    pub layout: CanonicalLayout,
    /// Why classification failed, if it did.
    pub classification_error: Option<String>,
    pub steps: Vec<StepReport>,
    pub elapsed: Duration,
}

impl HarmonizeReport {
    fn unclassified(asset: &Path, error: Option<String>, started: Instant) -> Self {
        Self {
            asset: asset.to_path_buf(),
            layout: CanonicalLayout::Unknown,
            classification_error: error,
            steps: Vec::new(),
            elapsed: started.elapsed(),
        }
    }

    /// Whether every step ran without failure.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.layout.is_known()
            && self
                .steps
                .iter()
                .all(|s| !matches!(s.outcome, StepOutcome::Failed { .. }))
    }

    /// Filter graphs applied, in order.
    #[must_use]
    pub fn applied_filters(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match &s.outcome {
                StepOutcome::Applied { filter, .. } => Some(filter.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Failed { .. }))
            .collect()
    }
}

/// Decides and applies the transform sequence for an asset.
pub struct HarmonizationEngine<C, R, T> {
    detector: C,
    probe: R,
    transformer: T,
    config: HarmonizeConfig,
    steps: Vec<HarmonizeStep>,
}

impl<C, R, T> HarmonizationEngine<C, R, T>
where
    C: CropDetector,
    R: ResolutionProbe,
    T: VideoTransformer,
{
    pub fn new(detector: C, probe: R, transformer: T, config: HarmonizeConfig) -> Self {
        Self {
            detector,
            probe,
            transformer,
            config,
            steps: default_steps(),
        }
    }

    /// Replaces the step list, e.g. to add a layout-specific rule.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<HarmonizeStep>) -> Self {
        self.steps = steps;
        self
    }

    #[must_use]
    pub fn config(&self) -> &HarmonizeConfig {
        &self.config
    }

    /// Harmonizes `video` and returns its layout; `Unknown` (label `""`)
    /// when the file is missing or cannot be classified.
    pub fn normalize(&self, video: &Path) -> CanonicalLayout {
        self.harmonize(video).layout
    }

    /// Harmonizes `video` and reports every step.
    pub fn harmonize(&self, video: &Path) -> HarmonizeReport {
        let started = Instant::now();
        log::info!("Harmonizing {}", video.display());

        if !video.is_file() {
            log::warn!("Skipping {}: file does not exist", video.display());
            return HarmonizeReport::unclassified(video, None, started);
        }

        let (content, resolution) = match self.measure_both(video) {
            Ok(measured) => measured,
            Err(e) => {
                log::error!("Cannot classify {}: {}", video.display(), e);
                return HarmonizeReport::unclassified(video, Some(e.to_string()), started);
            }
        };

        let ratio = content.aspect_ratio();
        let layout = CanonicalLayout::classify(ratio, self.config.layout_split_ratio);
        log::info!(
            "Content {} (ratio {:.2}) ---> format {}",
            content,
            ratio,
            layout
        );

        let steps = self
            .steps
            .iter()
            .map(|step| StepReport {
                step: step.name,
                outcome: self.run_step(video, step, layout, content, resolution),
            })
            .collect();

        let report = HarmonizeReport {
            asset: video.to_path_buf(),
            layout,
            classification_error: None,
            steps,
            elapsed: started.elapsed(),
        };
        log::info!(
            "Finished video reformatting of {} in {:.2}s",
            video.display(),
            report.elapsed.as_secs_f64()
        );
        report
    }

    fn run_step(
        &self,
        video: &Path,
        step: &HarmonizeStep,
        layout: CanonicalLayout,
        initial_content: Dimensions,
        initial_resolution: Dimensions,
    ) -> StepOutcome {
        let measured = match step.measurement {
            Measurement::Initial => Ok((initial_content, initial_resolution)),
            Measurement::ContentAndResolution => self.measure_both(video),
            Measurement::Resolution => self
                .measure_resolution(video)
                .map(|resolution| (initial_content, resolution)),
        };
        let (content, resolution) = match measured {
            Ok(m) => m,
            Err(e) => {
                log::error!("Step '{}' could not measure {}: {}", step.name, video.display(), e);
                return StepOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let ctx = RuleContext {
            layout,
            content,
            resolution,
            config: &self.config,
        };
        let Some((rule, plan)) = step.decide(&ctx) else {
            log::debug!("Step '{}': nothing to do", step.name);
            return StepOutcome::Skipped;
        };
        if plan.is_empty() {
            return StepOutcome::Skipped;
        }

        log::info!("Step '{}': {} ({})", step.name, rule, plan);
        match self.transformer.apply(video, &plan) {
            Ok(()) => StepOutcome::Applied {
                rule,
                filter: plan.filter_graph(),
            },
            Err(e) => {
                log::error!("Step '{}' failed on {}: {}", step.name, video.display(), e);
                StepOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    fn measure_both(&self, video: &Path) -> CoreResult<(Dimensions, Dimensions)> {
        let content = self
            .detector
            .detect_content_box(video)?
            .ok_or_else(|| missing(video))?;
        let resolution = self.measure_resolution(video)?;
        Ok((content, resolution))
    }

    fn measure_resolution(&self, video: &Path) -> CoreResult<Dimensions> {
        self.probe.resolution(video)?.ok_or_else(|| missing(video))
    }
}

fn missing(video: &Path) -> CoreError {
    CoreError::PathError(format!("{} disappeared", video.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::SimulatedMedia;

    fn engine(media: &SimulatedMedia) -> HarmonizationEngine<&SimulatedMedia, &SimulatedMedia, &SimulatedMedia> {
        HarmonizationEngine::new(media, media, media, HarmonizeConfig::default())
    }

    /// A real file must exist for the existence check; geometry is simulated.
    fn asset(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"video").unwrap();
        path
    }

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h).unwrap()
    }

    #[test]
    fn test_widescreen_band_needs_no_aspect_crop() {
        let dir = tempfile::tempdir().unwrap();
        for (w, h) in [(1920, 1080), (1280, 740), (1280, 702), (1746, 1000)] {
            let video = asset(&dir, &format!("band_{w}x{h}.mp4"));
            let media = SimulatedMedia::new();
            media.add_video(&video, (w, h), (w, h));
            assert!(ratio_in_layout_band(
                dims(w, h).aspect_ratio(),
                CanonicalLayout::Widescreen,
                &HarmonizeConfig::default()
            ));

            let report = engine(&media).harmonize(&video);
            assert_eq!(report.layout.label(), "16/9");
            assert_eq!(report.steps[0].outcome, StepOutcome::Skipped);
        }
    }

    #[test]
    fn test_ultrawide_width_crop() {
        let dir = tempfile::tempdir().unwrap();
        let video = asset(&dir, "wide.mp4");
        let media = SimulatedMedia::new();
        media.add_video(&video, (1280, 500), (1280, 500));

        let report = engine(&media).harmonize(&video);

        assert_eq!(report.layout, CanonicalLayout::UltraWide);
        assert_eq!(
            report.steps[0].outcome,
            StepOutcome::Applied {
                rule: "crop width to layout ratio",
                filter: "crop=1176:500".to_string()
            }
        );
        assert_eq!(media.resolution_of(&video), Some(dims(640, 360)));
    }

    #[test]
    fn test_ultrawide_band_needs_no_aspect_crop() {
        let dir = tempfile::tempdir().unwrap();
        let video = asset(&dir, "scope.mp4");
        let media = SimulatedMedia::new();
        media.add_video(&video, (1280, 540), (1280, 540));

        let report = engine(&media).harmonize(&video);

        assert_eq!(report.layout, CanonicalLayout::UltraWide);
        assert_eq!(report.steps[0].outcome, StepOutcome::Skipped);
        assert_eq!(media.resolution_of(&video), Some(dims(640, 360)));
    }

    #[test]
    fn test_final_resolution_is_target() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ((1920, 1080), (1920, 1080)),
            ((1440, 1080), (1440, 1080)),
            ((1280, 720), (1280, 544)),
            ((1280, 540), (1280, 540)),
            ((640, 480), (640, 480)),
            ((700, 360), (640, 360)),
            ((1920, 1080), (1440, 1080)),
        ];
        for (i, (resolution, content)) in cases.into_iter().enumerate() {
            let video = asset(&dir, &format!("case{i}.mp4"));
            let media = SimulatedMedia::new();
            media.add_video(&video, resolution, content);

            let report = engine(&media).harmonize(&video);
            assert!(report.is_complete(), "case {i}: {report:?}");
            assert_eq!(
                media.resolution_of(&video),
                Some(dims(640, 360)),
                "case {i}: applied {:?}",
                media.applied()
            );
        }
    }

    #[test]
    fn test_residual_width_bars_are_cropped() {
        let dir = tempfile::tempdir().unwrap();
        let video = asset(&dir, "pillar.mp4");
        let media = SimulatedMedia::new();
        media.add_video(&video, (700, 360), (640, 360));

        let report = engine(&media).harmonize(&video);

        assert_eq!(report.steps[0].outcome, StepOutcome::Skipped);
        assert_eq!(
            report.steps[1].outcome,
            StepOutcome::Applied {
                rule: "crop to content box",
                filter: "crop=640:360".to_string()
            }
        );
        assert_eq!(report.steps[2].outcome, StepOutcome::Skipped);
    }

    #[test]
    fn test_missing_file_is_blank() {
        let media = SimulatedMedia::new();
        let layout = engine(&media).normalize(Path::new("/nonexistent/song.mp4"));
        assert_eq!(layout.label(), "");
        assert!(media.applied().is_empty());
    }

    #[test]
    fn test_classification_failure_is_blank() {
        let dir = tempfile::tempdir().unwrap();
        let video = asset(&dir, "dark.mp4");
        let media = SimulatedMedia::new();
        media.add_video(&video, (1920, 1080), (1920, 1080));
        media.fail_next_detections(1);

        let report = engine(&media).harmonize(&video);
        assert_eq!(report.layout, CanonicalLayout::Unknown);
        assert!(report.classification_error.is_some());
        assert!(report.steps.is_empty());
    }

    #[test]
    fn test_failed_step_does_not_stop_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let video = asset(&dir, "tall.mp4");
        let media = SimulatedMedia::new();
        media.add_video(&video, (1440, 1080), (1440, 1080));
        media.fail_transforms_containing("crop=1440:810");

        let report = engine(&media).harmonize(&video);

        assert!(matches!(report.steps[0].outcome, StepOutcome::Failed { .. }));
        // Scale normalization still runs on the untouched 4:3 file.
        assert_eq!(
            report.steps[2].outcome,
            StepOutcome::Applied {
                rule: "scale and crop",
                filter: "scale=640:-2,crop=640:360".to_string()
            }
        );
        assert!(!report.is_complete());
        assert_eq!(report.failures().len(), 1);
        assert_eq!(media.resolution_of(&video), Some(dims(640, 360)));
    }

    #[test]
    fn test_failed_measurement_fails_only_that_step() {
        let dir = tempfile::tempdir().unwrap();
        let video = asset(&dir, "flaky.mp4");
        let media = SimulatedMedia::new();
        media.add_video(&video, (1920, 1080), (1920, 1080));

        // First detection classifies, the second (residual bars) fails.
        let detector = FailSecond {
            media: &media,
            calls: std::cell::Cell::new(0),
        };
        let engine = HarmonizationEngine::new(&detector, &media, &media, HarmonizeConfig::default());
        let report = engine.harmonize(&video);

        assert_eq!(report.layout, CanonicalLayout::Widescreen);
        assert!(matches!(report.steps[1].outcome, StepOutcome::Failed { .. }));
        assert_eq!(report.applied_filters(), vec!["scale=640:-2"]);
    }

    struct FailSecond<'a> {
        media: &'a SimulatedMedia,
        calls: std::cell::Cell<usize>,
    }

    impl CropDetector for FailSecond<'_> {
        fn detect_content_box(&self, video: &Path) -> CoreResult<Option<Dimensions>> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() == 2 {
                return Err(CoreError::NoCropDetected(video.display().to_string()));
            }
            self.media.detect_content_box(video)
        }
    }
}
