//! Video assets and the paths derived from them.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the video path for the detection cache sidecar.
pub const STATS_SIDECAR_SUFFIX: &str = ".stats.json";

/// A music video in the library, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoAsset {
    path: PathBuf,
}

impl VideoAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Asset id written to the statistics logs: the file stem.
    #[must_use]
    pub fn id(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Folder receiving the scene files: the video path without extension.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.path.with_extension("")
    }

    /// Detection cache sidecar, colocated with the video (`<video>.stats.json`).
    #[must_use]
    pub fn stats_sidecar(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(STATS_SIDECAR_SUFFIX);
        PathBuf::from(name)
    }
}

impl From<&Path> for VideoAsset {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for VideoAsset {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths() {
        let asset = VideoAsset::new("/library/clips/song1.mp4");
        assert_eq!(asset.id(), "song1");
        assert_eq!(asset.output_dir(), PathBuf::from("/library/clips/song1"));
        assert_eq!(
            asset.stats_sidecar(),
            PathBuf::from("/library/clips/song1.mp4.stats.json")
        );
    }

    #[test]
    fn test_id_keeps_inner_dots() {
        let asset = VideoAsset::new("band.live.2019.mp4");
        assert_eq!(asset.id(), "band.live.2019");
        assert_eq!(asset.output_dir(), PathBuf::from("band.live.2019"));
    }
}
