// ============================================================================
// mvprep-core/src/harmonize/rules.rs
// ============================================================================
//
// TRANSFORM RULES: The Harmonization Decision Table
//
// Harmonization is an ordered list of steps. Each step declares which
// measurements it needs and holds an ordered list of rules; the first rule
// whose predicate holds produces the step's filter plan. Rules read the
// target geometry from the classified layout, so they are shared by every
// canonical layout.
//
// KEY COMPONENTS:
// - RuleContext: layout, measurements and thresholds a rule decides on
// - TransformRule: (name, predicate, plan generator)
// - HarmonizeStep / Measurement: a step and the probes it runs first
// - default_steps: aspect correction, residual bars, scale normalization

use crate::config::HarmonizeConfig;
use crate::geometry::{Dimensions, relative_deviation, within_band};
use crate::layout::CanonicalLayout;
use crate::plan::CropPlan;

/// Inputs a rule decides on.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub layout: CanonicalLayout,
    /// Detected picture area without bars.
    pub content: Dimensions,
    /// Full encoded resolution.
    pub resolution: Dimensions,
    pub config: &'a HarmonizeConfig,
}

impl RuleContext<'_> {
    /// Content aspect ratio.
    #[must_use]
    pub fn content_ratio(&self) -> f64 {
        self.content.aspect_ratio()
    }

    /// Encoded aspect ratio.
    #[must_use]
    pub fn resolution_ratio(&self) -> f64 {
        self.resolution.aspect_ratio()
    }

    fn layout_ratio(&self) -> Option<(u32, u32, f64)> {
        let (num, den) = self.layout.ratio_parts()?;
        Some((num, den, f64::from(num) / f64::from(den)))
    }
}

/// A named predicate with the plan it produces when it holds.
#[derive(Clone, Copy)]
pub struct TransformRule {
    pub name: &'static str,
    pub applies: fn(&RuleContext<'_>) -> bool,
    pub plan: fn(&RuleContext<'_>) -> CropPlan,
}

impl std::fmt::Debug for TransformRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What a step probes before its rules are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    /// Reuse the measurements taken for classification.
    Initial,
    /// Re-detect the content box and re-probe the resolution.
    ContentAndResolution,
    /// Re-probe the resolution only.
    Resolution,
}

/// One harmonization step.
#[derive(Debug, Clone)]
pub struct HarmonizeStep {
    pub name: &'static str,
    pub measurement: Measurement,
    pub rules: Vec<TransformRule>,
}

impl HarmonizeStep {
    /// First applicable rule and its plan.
    #[must_use]
    pub fn decide(&self, ctx: &RuleContext<'_>) -> Option<(&'static str, CropPlan)> {
        self.rules
            .iter()
            .find(|rule| (rule.applies)(ctx))
            .map(|rule| (rule.name, (rule.plan)(ctx)))
    }
}

/// The four-step pipeline: classification happens before these run.
#[must_use]
pub fn default_steps() -> Vec<HarmonizeStep> {
    vec![
        HarmonizeStep {
            name: "aspect correction",
            measurement: Measurement::Initial,
            rules: vec![
                TransformRule {
                    name: "crop height to layout ratio",
                    applies: content_too_tall,
                    plan: crop_height_to_layout,
                },
                TransformRule {
                    name: "crop width to layout ratio",
                    applies: content_too_wide,
                    plan: crop_width_to_layout,
                },
            ],
        },
        HarmonizeStep {
            name: "residual bar removal",
            measurement: Measurement::ContentAndResolution,
            rules: vec![TransformRule {
                name: "crop to content box",
                applies: has_residual_bars,
                plan: crop_to_content,
            }],
        },
        HarmonizeStep {
            name: "scale normalization",
            measurement: Measurement::Resolution,
            rules: vec![
                TransformRule {
                    name: "scale and pad",
                    applies: |ctx| {
                        needs_scale(ctx)
                            && ctx.resolution_ratio()
                                > ctx.config.target_ratio() + ctx.config.ratio_tolerance
                    },
                    plan: |ctx| {
                        let c = ctx.config;
                        CropPlan::new()
                            .scale_to_width(c.target_width)
                            .pad(c.target_width, c.target_height)
                    },
                },
                TransformRule {
                    name: "scale and crop",
                    applies: |ctx| {
                        needs_scale(ctx)
                            && ctx.resolution_ratio()
                                < ctx.config.target_ratio() - ctx.config.ratio_tolerance
                    },
                    plan: |ctx| {
                        let c = ctx.config;
                        CropPlan::new()
                            .scale_to_width(c.target_width)
                            .crop(c.target_width, c.target_height)
                    },
                },
                TransformRule {
                    name: "scale",
                    applies: needs_scale,
                    plan: |ctx| CropPlan::new().scale_to_width(ctx.config.target_width),
                },
                TransformRule {
                    name: "crop height",
                    applies: |ctx| {
                        !needs_scale(ctx) && ctx.resolution.height() > ctx.config.target_height
                    },
                    plan: |ctx| {
                        CropPlan::new().crop(ctx.config.target_width, ctx.config.target_height)
                    },
                },
                TransformRule {
                    name: "pad height",
                    applies: |ctx| {
                        !needs_scale(ctx) && ctx.resolution.height() < ctx.config.target_height
                    },
                    plan: |ctx| {
                        CropPlan::new().pad(ctx.config.target_width, ctx.config.target_height)
                    },
                },
            ],
        },
    ]
}

// ---- Aspect correction ----

fn content_too_tall(ctx: &RuleContext<'_>) -> bool {
    ctx.layout_ratio()
        .is_some_and(|(_, _, target)| ctx.content_ratio() < target - ctx.config.ratio_tolerance)
}

fn content_too_wide(ctx: &RuleContext<'_>) -> bool {
    ctx.layout_ratio()
        .is_some_and(|(_, _, target)| ctx.content_ratio() > target + ctx.config.ratio_tolerance)
}

fn crop_height_to_layout(ctx: &RuleContext<'_>) -> CropPlan {
    let Some((num, den, _)) = ctx.layout_ratio() else {
        return CropPlan::new();
    };
    let width = ctx.content.width();
    CropPlan::new().crop(width, scale_floor(width, den, num))
}

fn crop_width_to_layout(ctx: &RuleContext<'_>) -> CropPlan {
    let Some((num, den, _)) = ctx.layout_ratio() else {
        return CropPlan::new();
    };
    let height = ctx.content.height();
    CropPlan::new().crop(scale_floor(height, num, den), height)
}

/// `floor(value * num / den)` without float rounding, never below 1.
fn scale_floor(value: u32, num: u32, den: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(num) / u64::from(den);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

// ---- Residual bars ----

fn has_residual_bars(ctx: &RuleContext<'_>) -> bool {
    let c = ctx.config;
    let width_dev = relative_deviation(ctx.resolution.width(), ctx.content.width());
    let height_dev = relative_deviation(ctx.resolution.height(), ctx.content.height());
    width_dev > c.residual_tolerance
        || (height_dev > c.residual_tolerance
            && (height_dev - c.letterbox_deviation).abs() > c.residual_tolerance)
}

fn crop_to_content(ctx: &RuleContext<'_>) -> CropPlan {
    CropPlan::new().crop(ctx.content.width(), ctx.content.height())
}

// ---- Scale normalization ----

fn needs_scale(ctx: &RuleContext<'_>) -> bool {
    ctx.resolution.width() != ctx.config.target_width
}

/// Whether a content ratio is accepted as-is for `layout`.
#[must_use]
pub fn ratio_in_layout_band(ratio: f64, layout: CanonicalLayout, config: &HarmonizeConfig) -> bool {
    layout
        .ratio()
        .is_some_and(|target| within_band(ratio, target, config.ratio_tolerance))
}
