//! Tantivy schema for code documents.
//!
//! - `id`: document key `base36(repo_id)_path` (string, stored)
//! - `repo_id`: owning repository (i64, indexed, stored, fast for sorting)
//! - `content`: file content (text, stored)
//! - `commit_id`: commit the content was read at (string, stored)
//! - `language`: language label (string, stored, fast for aggregation)
//! - `updated_at`: indexing time in epoch seconds (i64, stored, fast)

use tantivy::schema::{
    FAST, Field, INDEXED, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions,
};

use super::analyzer::CODE_TOKENIZER;

/// Field names shared by the schema and fast-field lookups.
pub mod names {
    /// Document key.
    pub const ID: &str = "id";
    /// Owning repository.
    pub const REPO_ID: &str = "repo_id";
    /// File content.
    pub const CONTENT: &str = "content";
    /// Commit id.
    pub const COMMIT_ID: &str = "commit_id";
    /// Language label.
    pub const LANGUAGE: &str = "language";
    /// Indexing time.
    pub const UPDATED_AT: &str = "updated_at";
}

/// Handles to all fields in the index schema.
#[derive(Debug, Clone)]
pub struct CodeSchema {
    /// The underlying Tantivy schema.
    schema: Schema,
    /// Document key.
    pub id: Field,
    /// Owning repository.
    pub repo_id: Field,
    /// File content.
    pub content: Field,
    /// Commit id.
    pub commit_id: Field,
    /// Language label.
    pub language: Field,
    /// Indexing time.
    pub updated_at: Field,
}

impl CodeSchema {
    /// Creates the schema with all fields configured.
    pub fn new() -> Self {
        let mut builder = Schema::builder();

        let id = builder.add_text_field(names::ID, STRING | STORED);
        let repo_id = builder.add_i64_field(names::REPO_ID, INDEXED | STORED | FAST);

        let content_options = TextOptions::default()
            .set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(CODE_TOKENIZER)
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            )
            .set_stored();
        let content = builder.add_text_field(names::CONTENT, content_options);

        let commit_id = builder.add_text_field(names::COMMIT_ID, STRING | STORED);
        let language = builder.add_text_field(names::LANGUAGE, STRING | STORED | FAST);
        let updated_at = builder.add_i64_field(names::UPDATED_AT, STORED | FAST);

        Self {
            schema: builder.build(),
            id,
            repo_id,
            content,
            commit_id,
            language,
            updated_at,
        }
    }

    /// Returns a reference to the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl Default for CodeSchema {
    fn default() -> Self {
        Self::new()
    }
}
