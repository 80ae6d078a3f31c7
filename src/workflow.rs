//! Report workflow
//!
//! Wires the pure report builder to its collaborators:
//! - a text source supplying the abstract
//! - a display sink holding the generated report and hint line
//! - a clipboard sink for copying
//! - a file sink for saving `report.md`

use crate::error::{ReportError, Result};
use crate::report::build_report;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Hint shown before anything is generated, and after clearing
pub const HINT_INITIAL: &str = "要旨を入力して「レポートを生成」を押してください。";
/// Hint shown when generation is attempted with an empty abstract
pub const HINT_EMPTY_INPUT: &str = "要旨を入力してください。";
/// Hint shown once a report is on display
pub const HINT_GENERATED: &str = "生成された内容を編集・追記して完成させてください。";

/// Copy button label at rest
pub const COPY_LABEL: &str = "コピー";
pub const COPY_LABEL_SUCCESS: &str = "コピーしました";
pub const COPY_LABEL_FAILURE: &str = "コピー失敗";

/// Suggested filename for downloads
pub const DEFAULT_FILENAME: &str = "report.md";
pub const MARKDOWN_MIME: &str = "text/markdown";

/// How long a copy result label stays up
pub const DEFAULT_COPY_STATUS: Duration = Duration::from_millis(2000);

/// Supplies the current abstract text
pub trait TextSource {
    fn abstract_text(&self) -> String;
}

impl TextSource for str {
    fn abstract_text(&self) -> String {
        self.to_string()
    }
}

impl TextSource for String {
    fn abstract_text(&self) -> String {
        self.clone()
    }
}

/// Receives a generated report, or the notice that there was nothing to generate
pub trait DisplaySink {
    fn show_report(&mut self, report: String);
    fn show_empty_notice(&mut self, notice: &'static str);
}

/// Places text on a clipboard
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// A file handed to a [`FileSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub contents: String,
}

/// Saves a report file, returning where it ended up
pub trait FileSink {
    fn save(&mut self, file: &ReportFile) -> Result<PathBuf>;
}

/// Result of the last copy attempt, shown until its deadline passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyStatus {
    Idle,
    Copied { until: Instant },
    Failed { until: Instant },
}

/// Display state of the report form
#[derive(Debug, Clone)]
pub struct ReportView {
    report: Option<String>,
    hint: &'static str,
    copy_status: CopyStatus,
    copy_status_duration: Duration,
}

impl Default for ReportView {
    fn default() -> Self {
        Self::new(DEFAULT_COPY_STATUS)
    }
}

impl ReportView {
    pub fn new(copy_status_duration: Duration) -> Self {
        Self {
            report: None,
            hint: HINT_INITIAL,
            copy_status: CopyStatus::Idle,
            copy_status_duration,
        }
    }

    /// Report currently on display
    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    pub fn hint(&self) -> &'static str {
        self.hint
    }

    /// Copy and download are only available while a report is displayed
    pub fn actions_enabled(&self) -> bool {
        self.report.is_some()
    }

    /// Copy button label at `now`, reverting once the status has expired
    pub fn copy_label(&self, now: Instant) -> &'static str {
        match self.copy_status {
            CopyStatus::Copied { until } if now < until => COPY_LABEL_SUCCESS,
            CopyStatus::Failed { until } if now < until => COPY_LABEL_FAILURE,
            _ => COPY_LABEL,
        }
    }

    /// Reset to the initial state
    pub fn clear(&mut self) {
        self.report = None;
        self.hint = HINT_INITIAL;
    }

    fn mark_copy(&mut self, ok: bool, now: Instant) {
        let until = now + self.copy_status_duration;
        self.copy_status = if ok {
            CopyStatus::Copied { until }
        } else {
            CopyStatus::Failed { until }
        };
    }
}

impl DisplaySink for ReportView {
    fn show_report(&mut self, report: String) {
        self.report = Some(report);
        self.hint = HINT_GENERATED;
    }

    fn show_empty_notice(&mut self, notice: &'static str) {
        self.report = None;
        self.hint = notice;
    }
}

/// Generate a report from the source and hand it to the display
///
/// An abstract that is empty after trimming never reaches the builder: the
/// display gets the empty-input notice instead and `EmptyInput` is returned.
pub fn generate<S, D>(source: &S, display: &mut D) -> Result<String>
where
    S: TextSource + ?Sized,
    D: DisplaySink + ?Sized,
{
    let abstract_text = source.abstract_text();
    if abstract_text.trim().is_empty() {
        tracing::info!("Empty abstract, nothing to generate");
        display.show_empty_notice(HINT_EMPTY_INPUT);
        return Err(ReportError::EmptyInput);
    }

    let report = build_report(&abstract_text);
    tracing::debug!(bytes = report.len(), "Generated report");
    display.show_report(report.clone());
    Ok(report)
}

/// Copy the displayed report to the clipboard
///
/// Returns `Ok(false)` when there is no report to copy.
pub fn copy(view: &mut ReportView, clipboard: &mut dyn ClipboardSink, now: Instant) -> Result<bool> {
    let Some(report) = view.report.clone() else {
        return Ok(false);
    };

    match clipboard.write_text(&report) {
        Ok(()) => {
            view.mark_copy(true, now);
            tracing::info!(bytes = report.len(), "Report copied to clipboard");
            Ok(true)
        }
        Err(e) => {
            view.mark_copy(false, now);
            tracing::warn!("Clipboard write failed: {}", e);
            Err(e)
        }
    }
}

/// Save the displayed report through the file sink
///
/// Returns `Ok(None)` when there is no report to save.
pub fn download(view: &ReportView, sink: &mut dyn FileSink, filename: &str) -> Result<Option<PathBuf>> {
    let Some(report) = view.report() else {
        return Ok(None);
    };

    let file = ReportFile {
        filename: filename.to_string(),
        mime_type: MARKDOWN_MIME,
        contents: report.to_string(),
    };
    let path = sink.save(&file)?;
    tracing::info!("Report saved to {}", path.display());
    Ok(Some(path))
}
