//! Report sinks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::info;

use super::ReportArtifact;

/// Destination for rendered reports.
pub trait ReportSink: Send + Sync {
    /// Store an artifact.
    fn write(&self, artifact: &ReportArtifact) -> io::Result<()>;
}

/// Writes each artifact as a file in a directory.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an artifact is written to.
    pub fn path_for(&self, artifact: &ReportArtifact) -> PathBuf {
        self.dir.join(&artifact.file_name)
    }
}

impl ReportSink for FileReportSink {
    fn write(&self, artifact: &ReportArtifact) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(artifact);
        fs::write(&path, &artifact.contents)?;
        info!(path = %path.display(), "Assets report saved");
        Ok(())
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    artifacts: Mutex<Vec<ReportArtifact>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifacts written so far.
    pub fn artifacts(&self) -> Vec<ReportArtifact> {
        self.artifacts.lock().clone()
    }
}

impl ReportSink for MemoryReportSink {
    fn write(&self, artifact: &ReportArtifact) -> io::Result<()> {
        self.artifacts.lock().push(artifact.clone());
        Ok(())
    }
}
