//! Indexed documents and their wire format.

use serde::{Deserialize, Serialize};

use crate::id::DocumentId;

/// One file as stored in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDocument {
    /// Repository and path.
    pub id: DocumentId,
    /// File content, with invalid UTF-8 replaced.
    pub content: String,
    /// Commit the content was read at.
    pub commit_id: String,
    /// Detected language label.
    pub language: String,
    /// Indexing time in seconds since the Unix epoch.
    pub updated_at: i64,
}

impl CodeDocument {
    /// Returns the stored-source form of this document.
    pub fn source(&self) -> IndexedSource {
        IndexedSource {
            repo_id: self.id.repo_id,
            content: self.content.clone(),
            commit_id: self.commit_id.clone(),
            language: self.language.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// The JSON body stored for every document.
///
/// The file path is not part of the body; it is recovered from the document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedSource {
    /// Owning repository.
    pub repo_id: i64,
    /// File content.
    pub content: String,
    /// Commit the content was read at.
    pub commit_id: String,
    /// Detected language label.
    pub language: String,
    /// Indexing time in epoch seconds.
    pub updated_at: i64,
}

impl IndexedSource {
    /// Reassembles a document from its id and stored body.
    pub fn into_document(self, id: DocumentId) -> CodeDocument {
        CodeDocument {
            id,
            content: self.content,
            commit_id: self.commit_id,
            language: self.language,
            updated_at: self.updated_at,
        }
    }
}
