//! File discovery module for finding video assets to process.
//!
//! Searches the top level of a library directory for `.mp4` files
//! (case-insensitive). Subdirectories are skipped, which also keeps the
//! per-asset scene folders out of the batch.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Whether `path` is a file the batch driver should process.
#[must_use]
pub fn is_video_asset(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"))
}

/// Finds `.mp4` assets in `input_dir`, sorted by path.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - The discovered assets
/// * `Err(CoreError::Io)` - If the directory cannot be read
/// * `Err(CoreError::NoFilesFound)` - If no `.mp4` file is present
///
/// # Examples
///
/// ```rust,no_run
/// use mvprep_core::find_video_assets;
/// use std::path::Path;
///
/// match find_video_assets(Path::new("/path/to/library")) {
///     Ok(files) => println!("Found {} videos", files.len()),
///     Err(e) => println!("Error finding videos: {}", e),
/// }
/// ```
pub fn find_video_assets(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            is_video_asset(&path).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }

    files.sort();
    Ok(files)
}
