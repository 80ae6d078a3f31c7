//! System clipboard via arboard

use crate::error::{ReportError, Result};
use crate::workflow::ClipboardSink;

/// Clipboard of the desktop session
///
/// The handle is opened lazily so that a headless session only fails when a
/// copy is actually attempted.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ReportError::Clipboard(e.to_string()))?;
            self.inner = Some(clipboard);
        }

        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ReportError::Clipboard(e.to_string())),
            None => Err(ReportError::Clipboard("clipboard unavailable".to_string())),
        }
    }
}
