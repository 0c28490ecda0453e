//! Frame geometry shared by the harmonization steps.
//!
//! Both the cropdetect output and ffprobe's stream size are reduced to a
//! [`Dimensions`] value. Parsing rejects zero or negative sizes, so every
//! `Dimensions` in the crate has positive width and height.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// Width and height of a picture area in pixels.
///
/// Only [`Dimensions::new`] and parsing construct values, so both sides are
/// always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Creates dimensions, rejecting a zero width or height.
    pub fn new(width: u32, height: u32) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions(format!("{width}x{height}")));
        }
        Ok(Self { width, height })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = CoreError;

    /// Parses the `WxH` form used by the crop and resolution probes.
    fn from_str(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        let (w, h) = trimmed
            .split_once('x')
            .ok_or_else(|| CoreError::InvalidDimensions(trimmed.to_string()))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|_| CoreError::InvalidDimensions(trimmed.to_string()))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|_| CoreError::InvalidDimensions(trimmed.to_string()))?;
        Self::new(width, height)
    }
}

/// Relative shortfall of `measured` against `real`: `(real - measured) / real`.
///
/// Used to compare the full encoded resolution with the detected content box.
#[must_use]
pub fn relative_deviation(real: u32, measured: u32) -> f64 {
    (f64::from(real) - f64::from(measured)) / f64::from(real)
}

/// Whether `ratio` lies inside `target ± tolerance` (bounds inclusive).
#[must_use]
pub fn within_band(ratio: f64, target: f64, tolerance: f64) -> bool {
    ratio >= target - tolerance && ratio <= target + tolerance
}
