pub mod error;
pub mod report;
pub mod settings;
pub mod sinks;
pub mod workflow;

pub use error::ReportError;
pub use report::{build_report, draft_report, split_sentences, ReportDraft, Section, SectionBody, SECTIONS};
pub use workflow::{ClipboardSink, DisplaySink, FileSink, ReportFile, ReportView, TextSource};
