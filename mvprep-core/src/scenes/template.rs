//! Per-scene output file naming.

use crate::config::{DEFAULT_SPLIT_TEMPLATE, SCENE_NUMBER_PLACEHOLDER, VIDEO_NAME_PLACEHOLDER};
use crate::error::{CoreError, CoreResult};
use std::fmt;

/// File name template with `$VIDEO_NAME` and `$SCENE_NUMBER` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTemplate(String);

impl SplitTemplate {
    /// Accepts templates that number their scenes.
    pub fn new(template: impl Into<String>) -> CoreResult<Self> {
        let template = template.into();
        if !template.contains(SCENE_NUMBER_PLACEHOLDER) {
            return Err(CoreError::Config(format!(
                "Split template '{template}' must contain {SCENE_NUMBER_PLACEHOLDER}"
            )));
        }
        Ok(Self(template))
    }

    /// File name of scene `number` (1-based, zero-padded to three digits).
    #[must_use]
    pub fn render(&self, video_name: &str, number: usize) -> String {
        self.0
            .replace(VIDEO_NAME_PLACEHOLDER, video_name)
            .replace(SCENE_NUMBER_PLACEHOLDER, &format!("{number:03}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SplitTemplate {
    fn default() -> Self {
        Self(DEFAULT_SPLIT_TEMPLATE.to_string())
    }
}

impl fmt::Display for SplitTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let template = SplitTemplate::default();
        assert_eq!(template.render("song1", 1), "song1-Scene-001.mp4");
        assert_eq!(template.render("song1", 1234), "song1-Scene-1234.mp4");

        let custom = SplitTemplate::new("$SCENE_NUMBER.mkv").unwrap();
        assert_eq!(custom.render("ignored", 7), "007.mkv");

        assert!(SplitTemplate::new("$VIDEO_NAME.mp4").is_err());
    }
}
