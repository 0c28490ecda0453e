//! Persisted segmentation status of an asset.
//!
//! The output folder is the marker: once it exists the asset counts as
//! segmented and is never split again. After a successful split the folder
//! also receives a small JSON manifest describing what was produced.

use super::Scene;
use crate::asset::VideoAsset;
use crate::error::CoreResult;
use serde::Serialize;
use std::path::PathBuf;

/// Name of the manifest written into a segmented asset's folder.
pub const MANIFEST_FILE_NAME: &str = "segmentation.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationStatus {
    Unsegmented,
    Segmented,
}

/// Reads and records whether an asset has been segmented.
pub trait StatusMarker {
    fn status(&self, asset: &VideoAsset) -> SegmentationStatus;

    /// Records a finished segmentation.
    fn mark_segmented(&self, asset: &VideoAsset, scenes: &[Scene], files: &[PathBuf])
    -> CoreResult<()>;
}

#[derive(Serialize)]
struct Manifest<'a> {
    asset: String,
    scene_count: usize,
    scenes: &'a [Scene],
    files: Vec<String>,
}

/// Uses the asset's output folder as the status marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderStatusMarker;

impl StatusMarker for FolderStatusMarker {
    fn status(&self, asset: &VideoAsset) -> SegmentationStatus {
        if asset.output_dir().exists() {
            SegmentationStatus::Segmented
        } else {
            SegmentationStatus::Unsegmented
        }
    }

    fn mark_segmented(
        &self,
        asset: &VideoAsset,
        scenes: &[Scene],
        files: &[PathBuf],
    ) -> CoreResult<()> {
        let dir = asset.output_dir();
        std::fs::create_dir_all(&dir)?;
        let manifest = Manifest {
            asset: asset.id(),
            scene_count: scenes.len(),
            scenes,
            files: files
                .iter()
                .filter_map(|f| f.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect(),
        };
        let content = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(dir.join(MANIFEST_FILE_NAME), content)?;
        Ok(())
    }
}
