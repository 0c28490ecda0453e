//! Canonical display layouts every asset is normalized toward.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target frame geometry of a harmonized asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalLayout {
    /// 16:9, delivered as 640x360.
    Widescreen,
    /// 40:17, delivered as 640x272 letterboxed inside 640x360.
    UltraWide,
    /// Not classified (missing file or failed first probe).
    Unknown,
}

impl CanonicalLayout {
    /// Classifies a content aspect ratio. Ratios below `split` are widescreen.
    #[must_use]
    pub fn classify(ratio: f64, split: f64) -> Self {
        if ratio < split {
            Self::Widescreen
        } else {
            Self::UltraWide
        }
    }

    /// Numerator and denominator of the layout's aspect ratio.
    #[must_use]
    pub fn ratio_parts(&self) -> Option<(u32, u32)> {
        match self {
            Self::Widescreen => Some((16, 9)),
            Self::UltraWide => Some((40, 17)),
            Self::Unknown => None,
        }
    }

    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        self.ratio_parts()
            .map(|(num, den)| f64::from(num) / f64::from(den))
    }

    /// Label reported to batch callers: "16/9", "40/17" or "".
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Widescreen => "16/9",
            Self::UltraWide => "40/17",
            Self::Unknown => "",
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for CanonicalLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(CanonicalLayout::classify(1.78, 2.0), CanonicalLayout::Widescreen);
        assert_eq!(CanonicalLayout::classify(1.33, 2.0), CanonicalLayout::Widescreen);
        assert_eq!(CanonicalLayout::classify(2.0, 2.0), CanonicalLayout::UltraWide);
        assert_eq!(CanonicalLayout::classify(2.37, 2.0), CanonicalLayout::UltraWide);
    }

    #[test]
    fn test_labels() {
        assert_eq!(CanonicalLayout::Widescreen.label(), "16/9");
        assert_eq!(CanonicalLayout::UltraWide.label(), "40/17");
        assert_eq!(CanonicalLayout::Unknown.label(), "");
        assert_eq!(CanonicalLayout::UltraWide.ratio_parts(), Some((40, 17)));
        assert!(CanonicalLayout::Unknown.ratio().is_none());
    }
}
