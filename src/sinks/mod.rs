//! Concrete sinks for the report workflow

mod clipboard;
mod directory;

pub use clipboard::SystemClipboard;
pub use directory::DirectorySink;
