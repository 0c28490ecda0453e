//! Per-asset detection cache persisted next to the video.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

const CACHE_VERSION: u32 = 1;

/// Per-frame difference scores computed for one asset.
///
/// Scores are only reusable with the frame rate and downscale factor they
/// were computed at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionCache {
    version: u32,
    fps: f64,
    downscale: u32,
    scores: Vec<f64>,
    #[serde(skip)]
    dirty: bool,
}

impl DetectionCache {
    /// An empty cache that nothing can be reused from.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: CACHE_VERSION,
            ..Default::default()
        }
    }

    /// Reads a cache sidecar.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let cache: Self = serde_json::from_str(&content).map_err(|e| {
            CoreError::DetectionCache(format!("{} is not a valid cache: {e}", path.display()))
        })?;
        if cache.version != CACHE_VERSION {
            return Err(CoreError::DetectionCache(format!(
                "{} has version {}, expected {CACHE_VERSION}",
                path.display(),
                cache.version
            )));
        }
        Ok(cache)
    }

    /// Reads the sidecar if it exists; an unreadable one is logged and
    /// replaced by an empty cache.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        if !path.is_file() {
            return Self::new();
        }
        match Self::load(path) {
            Ok(cache) => {
                log::debug!(
                    "Loaded {} cached frame scores from {}",
                    cache.scores.len(),
                    path.display()
                );
                cache
            }
            Err(e) => {
                log::warn!("Ignoring detection cache {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Writes the cache and clears the dirty flag.
    pub fn save(&mut self, path: &Path) -> CoreResult<()> {
        let content = serde_json::to_string(self)?;
        std::fs::write(path, content)?;
        self.dirty = false;
        log::debug!("Saved detection cache to {}", path.display());
        Ok(())
    }

    /// Whether the stored scores were computed at `downscale`.
    #[must_use]
    pub fn is_usable(&self, downscale: u32) -> bool {
        !self.scores.is_empty() && self.fps > 0.0 && self.downscale == downscale
    }

    /// Stores freshly computed scores and marks the cache dirty.
    pub fn replace(&mut self, fps: f64, downscale: u32, scores: Vec<f64>) {
        self.version = CACHE_VERSION;
        self.fps = fps;
        self.downscale = downscale;
        self.scores = scores;
        self.dirty = true;
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    #[must_use]
    pub fn downscale(&self) -> u32 {
        self.downscale
    }

    #[must_use]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Whether the cache holds scores not yet written to disk.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
