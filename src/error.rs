//! Error types for the report workflow

use std::path::PathBuf;

/// Failures surfaced by the report workflow and its sinks
///
/// Building a report never fails; these cover the steps around it.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Abstract was empty after trimming, nothing to generate
    #[error("abstract is empty")]
    EmptyInput,

    /// Clipboard write failed
    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    /// Report file could not be written
    #[error("failed to write {path}: {source}")]
    Download {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file could not be read or written
    #[error("settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
