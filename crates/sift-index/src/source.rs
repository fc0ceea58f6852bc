//! Inputs to indexing: blob content and file classification.

use std::collections::HashMap;

use sift_highlight::{LanguageDetector, UNKNOWN_LANGUAGE, is_text};

use crate::error::IndexError;

/// Supplies file content by blob id.
pub trait BlobSource {
    /// Returns the size of a blob in bytes without reading its content.
    fn blob_size(&self, blob: &str) -> Result<u64, IndexError>;

    /// Returns the raw bytes of a blob.
    fn blob_content(&self, blob: &str) -> Result<Vec<u8>, IndexError>;
}

/// Blobs held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobSource {
    /// Blob id to content.
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryBlobSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a blob.
    pub fn insert(&mut self, blob: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.blobs.insert(blob.into(), content.into());
    }

    /// Looks up a blob or reports it missing.
    fn get(&self, blob: &str) -> Result<&Vec<u8>, IndexError> {
        self.blobs.get(blob).ok_or_else(|| IndexError::Blob {
            blob: blob.to_string(),
            message: String::from("no such blob"),
        })
    }
}

impl BlobSource for MemoryBlobSource {
    fn blob_size(&self, blob: &str) -> Result<u64, IndexError> {
        Ok(self.get(blob)?.len() as u64)
    }

    fn blob_content(&self, blob: &str) -> Result<Vec<u8>, IndexError> {
        self.get(blob).cloned()
    }
}

/// What the classifier decided about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Language label, or `unknown`.
    pub language: String,
    /// Whether the file is text worth indexing.
    pub is_text: bool,
}

/// Decides a file's language and whether it is text.
pub trait Classifier: Send + Sync {
    /// Classifies `content` stored at `path`.
    fn classify(&self, path: &str, content: &[u8]) -> Classification;
}

/// Classifier backed by syntax definitions and a binary-content heuristic.
#[derive(Default)]
pub struct DefaultClassifier {
    /// Language lookup by name, extension and first line.
    detector: LanguageDetector,
}

impl DefaultClassifier {
    /// Creates a classifier with the bundled syntax definitions.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Classifier for DefaultClassifier {
    fn classify(&self, path: &str, content: &[u8]) -> Classification {
        if !is_text(path, content) {
            return Classification {
                language: String::from(UNKNOWN_LANGUAGE),
                is_text: false,
            };
        }
        let text = String::from_utf8_lossy(content);
        Classification {
            language: self.detector.detect(path, &text),
            is_text: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reports_size_and_content() {
        let mut blobs = MemoryBlobSource::new();
        blobs.insert("b1", "hello");
        assert_eq!(blobs.blob_size("b1").unwrap(), 5);
        assert_eq!(blobs.blob_content("b1").unwrap(), b"hello");
        assert!(matches!(
            blobs.blob_size("missing"),
            Err(IndexError::Blob { .. })
        ));
    }

    #[test]
    fn default_classifier_detects_text_and_language() {
        let classifier = DefaultClassifier::new();
        let result = classifier.classify("src/main.rs", b"fn main() {}\n");
        assert!(result.is_text);
        assert_eq!(result.language, "Rust");

        let binary = classifier.classify("a.out", b"\x7fELF\0\0\0");
        assert!(!binary.is_text);
    }
}
