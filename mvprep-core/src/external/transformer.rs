// ============================================================================
// mvprep-core/src/external/transformer.rs
// ============================================================================
//
// VIDEO TRANSFORMER: In-place Filter Application
//
// ffmpeg cannot read and write the same file, so a transform moves the
// original aside to `<stem>_temp.<ext>`, encodes back to the original name
// and then drops the moved-aside copy. WorkingCopy owns that moved-aside file:
// commit deletes it, rollback (explicit or on drop) puts it back.
//
// KEY COMPONENTS:
// - WorkingCopy: scoped rename/commit/rollback guard
// - FfmpegTransformer: VideoTransformer running `-vf <filter graph>`

use super::{FfmpegSpawner, VideoTransformer, run_to_completion};
use crate::error::{CoreError, CoreResult};
use crate::plan::CropPlan;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the file stem of the moved-aside original.
pub const WORKING_COPY_SUFFIX: &str = "_temp";

// ============================================================================
// WORKING COPY
// ============================================================================

/// The original of a file being rewritten in place.
///
/// Until [`commit`](Self::commit) is called the original is recoverable;
/// dropping an uncommitted working copy restores it.
#[derive(Debug)]
pub struct WorkingCopy {
    target: PathBuf,
    source: PathBuf,
    settled: bool,
}

impl WorkingCopy {
    /// Moves `target` aside so a new file can be written at its path.
    ///
    /// Refuses to start while a moved-aside file from an interrupted run is
    /// still present, since it may be the only copy of the original.
    pub fn begin(target: &Path) -> CoreResult<Self> {
        if !target.is_file() {
            return Err(CoreError::PathError(format!(
                "Cannot transform missing file {}",
                target.display()
            )));
        }
        let source = Self::source_path_for(target)?;
        if source.exists() {
            return Err(CoreError::PathError(format!(
                "Leftover working copy {} from an interrupted transform; restore or remove it before transforming {}",
                source.display(),
                target.display()
            )));
        }
        std::fs::rename(target, &source)?;
        log::debug!("Moved {} aside to {}", target.display(), source.display());
        Ok(Self {
            target: target.to_path_buf(),
            source,
            settled: false,
        })
    }

    /// Path the moved-aside original can be read from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Path the new content must be written to.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Keeps the new file and deletes the original.
    ///
    /// Once the new file is in place the transform counts as done; failing to
    /// delete the original only leaves it behind with a warning.
    pub fn commit(mut self) -> CoreResult<()> {
        self.settled = true;
        if !self.target.is_file() {
            self.restore()?;
            return Err(CoreError::OperationFailed(format!(
                "Transform produced no output at {}",
                self.target.display()
            )));
        }
        if let Err(e) = std::fs::remove_file(&self.source) {
            log::warn!(
                "Transformed {} but could not remove {}: {}",
                self.target.display(),
                self.source.display(),
                e
            );
        }
        Ok(())
    }

    /// Discards any new file and puts the original back.
    pub fn rollback(mut self) -> CoreResult<()> {
        self.settled = true;
        self.restore()
    }

    fn restore(&self) -> CoreResult<()> {
        if self.target.exists() {
            std::fs::remove_file(&self.target)?;
        }
        std::fs::rename(&self.source, &self.target)?;
        log::debug!("Restored {}", self.target.display());
        Ok(())
    }

    fn source_path_for(target: &Path) -> CoreResult<PathBuf> {
        let stem = target.file_stem().ok_or_else(|| {
            CoreError::PathError(format!("No file name in {}", target.display()))
        })?;
        let mut name = OsString::from(stem);
        name.push(WORKING_COPY_SUFFIX);
        if let Some(ext) = target.extension() {
            name.push(".");
            name.push(ext);
        }
        Ok(target.with_file_name(name))
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        if !self.settled {
            if let Err(e) = self.restore() {
                log::error!(
                    "Failed to restore {} from {}: {}",
                    self.target.display(),
                    self.source.display(),
                    e
                );
            }
        }
    }
}

// ============================================================================
// FFMPEG TRANSFORMER
// ============================================================================

/// [`VideoTransformer`] encoding through ffmpeg's `-vf` option.
#[derive(Debug, Clone)]
pub struct FfmpegTransformer<S: FfmpegSpawner> {
    spawner: S,
}

impl<S: FfmpegSpawner> FfmpegTransformer<S> {
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }
}

impl<S: FfmpegSpawner> VideoTransformer for FfmpegTransformer<S> {
    fn apply(&self, video: &Path, plan: &CropPlan) -> CoreResult<()> {
        if plan.is_empty() {
            return Ok(());
        }

        let copy = WorkingCopy::begin(video)?;

        let mut cmd = FfmpegCommand::new();
        cmd.args(["-loglevel", "error"]);
        cmd.input(copy.source().to_string_lossy().as_ref());
        cmd.args(["-vf", &plan.filter_graph()]);
        cmd.args(["-y"]);
        cmd.output(copy.target().to_string_lossy().as_ref());

        match run_to_completion(&self.spawner, cmd, "transform") {
            Ok(_) => {
                copy.commit()?;
                log::info!("Applied '{}' to {}", plan, video.display());
                Ok(())
            }
            Err(e) => {
                if let Err(restore_err) = copy.rollback() {
                    log::error!("Rollback of {} failed: {}", video.display(), restore_err);
                }
                Err(e)
            }
        }
    }
}
