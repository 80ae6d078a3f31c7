//! Saves report files into a directory

use crate::error::{ReportError, Result};
use crate::workflow::{FileSink, ReportFile};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes each report file into a fixed directory, overwriting any previous one
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&mut self, file: &ReportFile) -> Result<PathBuf> {
        // Only the final component is honoured so a filename cannot escape the directory
        let name = Path::new(&file.filename)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(crate::workflow::DEFAULT_FILENAME));
        let path = self.dir.join(name);

        fs::create_dir_all(&self.dir).map_err(|source| ReportError::Download {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, file.contents.as_bytes()).map_err(|source| ReportError::Download {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(mime = file.mime_type, "Wrote {}", path.display());
        Ok(path)
    }
}
