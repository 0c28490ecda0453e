// ============================================================================
// mvprep-core/src/scenes/stats.rs
// ============================================================================
//
// SCENE STATISTICS: Append-only Records and their Sinks
//
// Each segmented asset contributes one line per scene to the scene-length
// log and one line to the scene-count log. The workflow hands all records of
// an asset to a StatsSink in a single call; the file sink opens, appends,
// flushes and closes both logs inside that call.

use crate::error::CoreResult;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One line of statistics about a segmented asset.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneStatsRecord {
    /// `asset,frames,seconds`
    SceneLength {
        asset_id: String,
        frame_length: u64,
        duration_secs: f64,
    },
    /// `asset,count`
    SceneCount { asset_id: String, scene_count: usize },
}

impl fmt::Display for SceneStatsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SceneLength {
                asset_id,
                frame_length,
                duration_secs,
            } => write!(f, "{asset_id},{frame_length},{duration_secs:.6}"),
            Self::SceneCount {
                asset_id,
                scene_count,
            } => write!(f, "{asset_id},{scene_count}"),
        }
    }
}

/// Append-only destination for scene statistics.
pub trait StatsSink {
    /// Appends every record of one asset.
    fn record(&mut self, records: &[SceneStatsRecord]) -> CoreResult<()>;
}

impl<T: StatsSink + ?Sized> StatsSink for &mut T {
    fn record(&mut self, records: &[SceneStatsRecord]) -> CoreResult<()> {
        (**self).record(records)
    }
}

/// Appends to the two shared log files.
#[derive(Debug, Clone)]
pub struct FileStatsSink {
    length_log: PathBuf,
    count_log: PathBuf,
}

impl FileStatsSink {
    pub fn new(length_log: impl Into<PathBuf>, count_log: impl Into<PathBuf>) -> Self {
        Self {
            length_log: length_log.into(),
            count_log: count_log.into(),
        }
    }

    #[must_use]
    pub fn length_log(&self) -> &Path {
        &self.length_log
    }

    #[must_use]
    pub fn count_log(&self) -> &Path {
        &self.count_log
    }

    fn append(path: &Path, lines: &[String]) -> CoreResult<()> {
        if lines.is_empty() {
            return Ok(());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        file.flush()?;
        Ok(())
    }
}

impl StatsSink for FileStatsSink {
    fn record(&mut self, records: &[SceneStatsRecord]) -> CoreResult<()> {
        let (lengths, counts): (Vec<&SceneStatsRecord>, Vec<&SceneStatsRecord>) = records
            .iter()
            .partition(|r| matches!(r, SceneStatsRecord::SceneLength { .. }));

        let render = |rs: Vec<&SceneStatsRecord>| rs.iter().map(ToString::to_string).collect::<Vec<_>>();
        Self::append(&self.length_log, &render(lengths))?;
        Self::append(&self.count_log, &render(counts))?;
        Ok(())
    }
}

/// Keeps records in memory, for tests and callers that aggregate themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStatsSink {
    records: Vec<SceneStatsRecord>,
    calls: usize,
}

impl MemoryStatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[SceneStatsRecord] {
        &self.records
    }

    /// Number of `record` calls received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Rendered lines of one log, in the order they were recorded.
    #[must_use]
    pub fn length_lines(&self) -> Vec<String> {
        self.lines(|r| matches!(r, SceneStatsRecord::SceneLength { .. }))
    }

    #[must_use]
    pub fn count_lines(&self) -> Vec<String> {
        self.lines(|r| matches!(r, SceneStatsRecord::SceneCount { .. }))
    }

    fn lines(&self, keep: impl Fn(&SceneStatsRecord) -> bool) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| keep(r))
            .map(ToString::to_string)
            .collect()
    }
}

impl StatsSink for MemoryStatsSink {
    fn record(&mut self, records: &[SceneStatsRecord]) -> CoreResult<()> {
        self.calls += 1;
        self.records.extend_from_slice(records);
        Ok(())
    }
}
