//! Harmonization through the public collaborator traits.
//!
//! `FakeVideo` keeps the geometry of one video in memory and applies crop,
//! scale and pad plans to it; the on-disk file only has to exist.

use mvprep_core::external::{CropDetector, ResolutionProbe, VideoTransformer};
use mvprep_core::harmonize::{HarmonizeStep, Measurement, TransformRule, default_steps};
use mvprep_core::{
    CanonicalLayout, CoreError, CoreResult, CropPlan, Dimensions, FilterOp, HarmonizationEngine,
};
use mvprep_core::config::HarmonizeConfig;
use std::cell::RefCell;
use std::path::Path;

struct FakeVideo {
    resolution: RefCell<Dimensions>,
    content: RefCell<Dimensions>,
    log: RefCell<Vec<String>>,
}

impl FakeVideo {
    fn new(resolution: (u32, u32), content: (u32, u32)) -> Self {
        Self {
            resolution: RefCell::new(Dimensions::new(resolution.0, resolution.1).unwrap()),
            content: RefCell::new(Dimensions::new(content.0, content.1).unwrap()),
            log: RefCell::new(Vec::new()),
        }
    }
}

impl CropDetector for FakeVideo {
    fn detect_content_box(&self, _video: &Path) -> CoreResult<Option<Dimensions>> {
        Ok(Some(*self.content.borrow()))
    }
}

impl ResolutionProbe for FakeVideo {
    fn resolution(&self, _video: &Path) -> CoreResult<Option<Dimensions>> {
        Ok(Some(*self.resolution.borrow()))
    }
}

impl VideoTransformer for FakeVideo {
    fn apply(&self, _video: &Path, plan: &CropPlan) -> CoreResult<()> {
        let mut res = self.resolution.borrow_mut();
        let mut content = self.content.borrow_mut();
        for op in plan.ops() {
            match *op {
                FilterOp::Crop { width, height } => {
                    if width > res.width() || height > res.height() {
                        return Err(CoreError::OperationFailed(format!("bad crop {op}")));
                    }
                    *res = Dimensions::new(width, height)?;
                    *content = Dimensions::new(
                        content.width().min(width),
                        content.height().min(height),
                    )?;
                }
                FilterOp::Scale { width, .. } => {
                    let f = f64::from(width) / f64::from(res.width());
                    let height = ((f64::from(res.height()) * f / 2.0).round() as u32) * 2;
                    *content = Dimensions::new(
                        ((f64::from(content.width()) * f).round() as u32).min(width),
                        ((f64::from(content.height()) * f).round() as u32).min(height),
                    )?;
                    *res = Dimensions::new(width, height)?;
                }
                FilterOp::Pad { width, height } => {
                    *res = Dimensions::new(width, height)?;
                }
            }
        }
        self.log.borrow_mut().push(plan.filter_graph());
        Ok(())
    }
}

fn existing_file() -> tempfile::NamedTempFile {
    tempfile::Builder::new().suffix(".mp4").tempfile().unwrap()
}

#[test]
fn test_letterboxed_ultrawide_keeps_its_bars() {
    let file = existing_file();
    let video = FakeVideo::new((1920, 1080), (1920, 816));
    let engine = HarmonizationEngine::new(&video, &video, &video, HarmonizeConfig::default());

    let layout = engine.normalize(file.path());

    assert_eq!(layout, CanonicalLayout::UltraWide);
    assert_eq!(layout.label(), "40/17");
    assert_eq!(*video.log.borrow(), vec!["scale=640:-2"]);
    assert_eq!(*video.resolution.borrow(), Dimensions::new(640, 360).unwrap());
}

#[test]
fn test_pillarboxed_widescreen() {
    let file = existing_file();
    let video = FakeVideo::new((1280, 720), (960, 720));
    let engine = HarmonizationEngine::new(&video, &video, &video, HarmonizeConfig::default());

    let report = engine.harmonize(file.path());

    assert_eq!(report.layout.label(), "16/9");
    assert!(report.is_complete());
    assert_eq!(report.applied_filters(), vec!["crop=960:540", "scale=640:-2"]);
    assert_eq!(*video.resolution.borrow(), Dimensions::new(640, 360).unwrap());
}

#[test]
fn test_missing_file_is_blank() {
    let video = FakeVideo::new((1920, 1080), (1920, 1080));
    let engine = HarmonizationEngine::new(&video, &video, &video, HarmonizeConfig::default());

    assert_eq!(engine.normalize(Path::new("/nonexistent/clip.mp4")).label(), "");
    assert!(video.log.borrow().is_empty());
}

#[test]
fn test_custom_steps() {
    let file = existing_file();
    let video = FakeVideo::new((1920, 1080), (1920, 1080));

    let mut steps = default_steps();
    steps.insert(
        0,
        HarmonizeStep {
            name: "square",
            measurement: Measurement::Initial,
            rules: vec![TransformRule {
                name: "square crop",
                applies: |ctx| ctx.layout == CanonicalLayout::Widescreen,
                plan: |ctx| CropPlan::new().crop(ctx.content.height(), ctx.content.height()),
            }],
        },
    );
    let engine = HarmonizationEngine::new(&video, &video, &video, HarmonizeConfig::default())
        .with_steps(steps);

    let report = engine.harmonize(file.path());

    assert_eq!(report.steps.len(), 4);
    assert_eq!(report.applied_filters()[0], "crop=1080:1080");
}
