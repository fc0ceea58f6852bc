//! Error types for the sift-index crate.

use std::{io, path::PathBuf};

use sift_config::ConfigError;
use thiserror::Error;

/// Errors that can occur while indexing or searching code.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Failed to open or create the index.
    #[error("failed to open index at {path}: {message}")]
    OpenIndex {
        /// Path to the index directory.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to write to the index.
    #[error("failed to write to index: {0}")]
    Write(String),

    /// Failed to commit changes to the index.
    #[error("failed to commit index: {0}")]
    Commit(String),

    /// Failed to run a query against the index.
    #[error("search failed: {0}")]
    Search(String),

    /// An HTTP request to the search backend failed.
    #[error("request to search backend failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A request or response body could not be (de)serialized.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The search backend rejected a request.
    #[error("search backend error: {0}")]
    Backend(String),

    /// A git command failed.
    #[error("git {command} failed: {message}")]
    Git {
        /// The git subcommand that was run.
        command: String,
        /// Captured stderr or spawn error.
        message: String,
    },

    /// Blob metadata from the blob source could not be understood.
    #[error("malformed blob data for {blob}: {message}")]
    Blob {
        /// Blob identifier.
        blob: String,
        /// What was wrong with it.
        message: String,
    },

    /// The configuration could not be applied.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl IndexError {
    /// Creates an `OpenIndex` error from a path and Tantivy error.
    pub(crate) fn open_index(path: PathBuf, source: &tantivy::TantivyError) -> Self {
        Self::OpenIndex {
            path,
            message: source.to_string(),
        }
    }

    /// Creates a `Write` error from a Tantivy error.
    pub(crate) fn write(source: &tantivy::TantivyError) -> Self {
        Self::Write(source.to_string())
    }

    /// Creates a `Commit` error from a Tantivy error.
    pub(crate) fn commit(source: &tantivy::TantivyError) -> Self {
        Self::Commit(source.to_string())
    }

    /// Creates a `Search` error from a Tantivy error.
    pub(crate) fn search(source: &tantivy::TantivyError) -> Self {
        Self::Search(source.to_string())
    }
}
