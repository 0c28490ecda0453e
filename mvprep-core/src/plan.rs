//! Crop plans: ordered ffmpeg filter operations handed to the transformer.

use std::fmt;

/// A single geometric filter in a [`CropPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Centered crop to `width`x`height`.
    Crop { width: u32, height: u32 },
    /// Scale to `width`; a negative height keeps the aspect ratio
    /// (`-2` rounds to an even value).
    Scale { width: u32, height: i32 },
    /// Pad to `width`x`height` with the picture centered.
    Pad { width: u32, height: u32 },
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crop { width, height } => write!(f, "crop={width}:{height}"),
            Self::Scale { width, height } => write!(f, "scale={width}:{height}"),
            Self::Pad { width, height } => {
                write!(f, "pad={width}:{height}:(ow-iw)/2:(oh-ih)/2")
            }
        }
    }
}

/// Ordered filter chain, rendered as a comma-separated ffmpeg `-vf` graph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CropPlan {
    ops: Vec<FilterOp>,
}

impl CropPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn crop(mut self, width: u32, height: u32) -> Self {
        self.ops.push(FilterOp::Crop { width, height });
        self
    }

    /// Scales to `width`, keeping the aspect ratio with an even height.
    #[must_use]
    pub fn scale_to_width(mut self, width: u32) -> Self {
        self.ops.push(FilterOp::Scale { width, height: -2 });
        self
    }

    #[must_use]
    pub fn pad(mut self, width: u32, height: u32) -> Self {
        self.ops.push(FilterOp::Pad { width, height });
        self
    }

    #[must_use]
    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The `-vf` argument for ffmpeg.
    #[must_use]
    pub fn filter_graph(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CropPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_graph_rendering() {
        assert_eq!(CropPlan::new().crop(1270, 540).filter_graph(), "crop=1270:540");
        assert_eq!(
            CropPlan::new().scale_to_width(640).pad(640, 360).filter_graph(),
            "scale=640:-2,pad=640:360:(ow-iw)/2:(oh-ih)/2"
        );
        assert_eq!(
            CropPlan::new().scale_to_width(640).crop(640, 360).filter_graph(),
            "scale=640:-2,crop=640:360"
        );
        assert!(CropPlan::new().is_empty());
        assert_eq!(CropPlan::new().filter_graph(), "");
    }
}
