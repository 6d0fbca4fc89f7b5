//! Document sources supplying the business context text.
//!
//! The engine only ever consumes extracted plain text; layout understanding
//! is out of scope, so the concrete source reads a UTF-8 text export.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while loading a business document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document does not exist at the configured path.
    #[error("document not found: {0}")]
    NotFound(PathBuf),
    /// The document exists but could not be read as text.
    #[error("document unreadable: {0}")]
    Unreadable(String),
    /// A cleanup pattern failed to compile.
    #[error("regex error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Source of extracted business-document text.
pub trait DocumentSource: Send + Sync {
    /// Extract the full plain text of the document.
    ///
    /// # Errors
    /// [`DocumentError::NotFound`] when the document is missing,
    /// [`DocumentError::Unreadable`] when it cannot be decoded.
    fn extract(&self) -> Result<String, DocumentError>;
}

/// Reads a UTF-8 plain-text export of the business document and normalizes
/// its whitespace.
pub struct TextDocumentSource {
    path: PathBuf,
    space_runs: Regex,
    blank_runs: Regex,
}

impl TextDocumentSource {
    /// Create a source for the document at `path`.
    ///
    /// # Errors
    /// Returns an error if the cleanup patterns fail to compile.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        Ok(Self {
            path: path.into(),
            space_runs: Regex::new(r"[ \t]+")?,
            blank_runs: Regex::new(r"\n{3,}")?,
        })
    }

    /// Path this source reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Collapse runs of spaces and excess blank lines, keeping paragraphs.
    fn normalize(&self, raw: &str) -> String {
        let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
        let collapsed = self.space_runs.replace_all(&unified, " ");
        let compacted = self.blank_runs.replace_all(&collapsed, "\n\n");
        compacted.trim().to_string()
    }
}

impl DocumentSource for TextDocumentSource {
    fn extract(&self) -> Result<String, DocumentError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => DocumentError::NotFound(self.path.clone()),
            _ => DocumentError::Unreadable(err.to_string()),
        })?;
        Ok(self.normalize(&raw))
    }
}

/// Size summary of an extracted document.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DocumentStats {
    /// Character count of the extracted text.
    pub chars: usize,
    /// Whitespace-separated word count.
    pub words: usize,
}

/// Compute size statistics for extracted text.
#[must_use]
pub fn stats(text: &str) -> DocumentStats {
    DocumentStats {
        chars: text.chars().count(),
        words: text.split_whitespace().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("frontdesk-doc-test-{name}-{}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let source = TextDocumentSource::new("/nonexistent/business_info.txt").unwrap();
        assert!(matches!(
            source.extract(),
            Err(DocumentError::NotFound(_))
        ));
    }

    #[test]
    fn test_extract_normalizes_whitespace() {
        let path = write_temp(
            "normalize",
            "Opening   hours:\t9-5\r\n\r\n\r\n\r\nClosed  Sundays\n",
        );
        let source = TextDocumentSource::new(&path).unwrap();
        let text = source.extract().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(text, "Opening hours: 9-5\n\nClosed Sundays");
    }

    #[test]
    fn test_empty_document_extracts_to_empty_text() {
        let path = write_temp("empty", "   \n\n  ");
        let source = TextDocumentSource::new(&path).unwrap();
        let text = source.extract().unwrap();
        std::fs::remove_file(&path).ok();

        assert!(text.is_empty());
    }

    #[test]
    fn test_stats_counts_words_and_chars() {
        let counted = stats("We sell widgets.");
        assert_eq!(counted.words, 3);
        assert_eq!(counted.chars, 16);
    }
}
