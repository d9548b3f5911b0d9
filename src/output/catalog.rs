//! JSON catalog writer

use crate::crawler::Book;
use crate::Result;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;

/// Renders books as a 4-space indented JSON array
///
/// Non-ASCII text (Cyrillic titles and comments) is emitted as-is, not escaped.
pub fn render_catalog(books: &[Book]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    books.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Writes the catalog to `path`, creating parent directories as needed
///
/// An existing file is overwritten.
pub fn write_catalog(books: &[Book], path: &Path) -> Result<()> {
    let rendered = render_catalog(books)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, rendered)?;

    tracing::info!("Wrote {} books to {}", books.len(), path.display());
    Ok(())
}
