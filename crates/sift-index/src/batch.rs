//! Turning a changeset into index writes.

use std::time::{SystemTime, UNIX_EPOCH};

use sift_config::{Config, PathFilter};
use tracing::debug;

use crate::{
    changeset::Changeset,
    document::CodeDocument,
    error::IndexError,
    id::DocumentId,
    source::{BlobSource, Classifier, DefaultClassifier},
};

/// One write in a bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOp {
    /// Insert the document, replacing any document with the same id.
    Upsert(CodeDocument),
    /// Remove the document with this id if present.
    Delete(DocumentId),
}

impl BulkOp {
    /// Returns the id this operation targets.
    pub fn id(&self) -> &DocumentId {
        match self {
            Self::Upsert(doc) => &doc.id,
            Self::Delete(id) => id,
        }
    }
}

/// Decides, per changed file, whether it is indexed, removed or skipped.
pub struct BatchPlanner {
    /// Files larger than this are removed instead of indexed.
    max_file_size: u64,
    /// Paths outside the filter are removed instead of indexed.
    filter: PathFilter,
    /// Language and text classification.
    classifier: Box<dyn Classifier>,
}

impl BatchPlanner {
    /// Creates a planner.
    pub fn new(max_file_size: u64, filter: PathFilter, classifier: Box<dyn Classifier>) -> Self {
        Self {
            max_file_size,
            filter,
            classifier,
        }
    }

    /// Creates a planner from the `[index]` settings with the default classifier.
    pub fn from_config(config: &Config) -> Result<Self, IndexError> {
        Ok(Self::new(
            config.index.max_file_size,
            config.path_filter()?,
            Box::new(DefaultClassifier::new()),
        ))
    }

    /// Plans the writes for one commit of a repository.
    ///
    /// Each update is checked against the path filter, then its size is read (oversized files
    /// become deletes without their content being fetched), then its content is read and
    /// classified. Non-text files are skipped entirely. Removed paths become deletes. Blob
    /// errors abort the whole plan.
    pub fn plan(
        &self,
        repo_id: i64,
        commit: &str,
        changes: &Changeset,
        blobs: &dyn BlobSource,
    ) -> Result<Vec<BulkOp>, IndexError> {
        let updated_at = now_epoch_secs();
        let mut ops = Vec::with_capacity(changes.len());

        for (path, blob) in &changes.updates {
            let id = DocumentId::new(repo_id, path.as_str());
            if !self.filter.matches(path) {
                debug!(path = %path, "path excluded by filter");
                ops.push(BulkOp::Delete(id));
                continue;
            }

            let size = blobs.blob_size(blob)?;
            if size > self.max_file_size {
                debug!(path = %path, size, max = self.max_file_size, "file too large, removing");
                ops.push(BulkOp::Delete(id));
                continue;
            }

            let bytes = blobs.blob_content(blob)?;
            let class = self.classifier.classify(path, &bytes);
            if !class.is_text {
                debug!(path = %path, "skipping non-text file");
                continue;
            }

            ops.push(BulkOp::Upsert(CodeDocument {
                id,
                content: String::from_utf8_lossy(&bytes).into_owned(),
                commit_id: commit.to_string(),
                language: class.language,
                updated_at,
            }));
        }

        ops.extend(
            changes
                .removed
                .iter()
                .map(|path| BulkOp::Delete(DocumentId::new(repo_id, path.as_str()))),
        );

        Ok(ops)
    }
}

/// Current time in seconds since the Unix epoch.
fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Classification, MemoryBlobSource};

    /// Treats `.bin` files as binary and everything else as text in "Text".
    struct ExtensionClassifier;

    impl Classifier for ExtensionClassifier {
        fn classify(&self, path: &str, _content: &[u8]) -> Classification {
            Classification {
                language: String::from("Text"),
                is_text: !path.ends_with(".bin"),
            }
        }
    }

    fn planner(max_file_size: u64, exclude: &[&str]) -> BatchPlanner {
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        let filter = PathFilter::compile(&[String::from("**")], &exclude).unwrap();
        BatchPlanner::new(max_file_size, filter, Box::new(ExtensionClassifier))
    }

    fn blobs() -> MemoryBlobSource {
        let mut blobs = MemoryBlobSource::new();
        blobs.insert("small", "fn small() {}\n");
        blobs.insert("big", vec![b'x'; 100]);
        blobs.insert("binary", vec![0u8, 1, 2]);
        blobs.insert("lossy", vec![b'o', b'k', 0xff, b'!']);
        blobs
    }

    #[test]
    fn small_text_file_is_upserted() {
        let mut changes = Changeset::new();
        changes.update("src/small.rs", "small");

        let ops = planner(64, &[]).plan(9, "abc", &changes, &blobs()).unwrap();
        assert_eq!(ops.len(), 1);
        let BulkOp::Upsert(doc) = &ops[0] else {
            panic!("expected upsert, got {ops:?}");
        };
        assert_eq!(doc.id, DocumentId::new(9, "src/small.rs"));
        assert_eq!(doc.content, "fn small() {}\n");
        assert_eq!(doc.commit_id, "abc");
        assert_eq!(doc.language, "Text");
        assert!(doc.updated_at > 0);
    }

    #[test]
    fn oversized_file_becomes_delete() {
        let mut changes = Changeset::new();
        changes.update("data.txt", "big");
        let ops = planner(64, &[]).plan(1, "c", &changes, &blobs()).unwrap();
        assert_eq!(ops, vec![BulkOp::Delete(DocumentId::new(1, "data.txt"))]);

        let mut removal = Changeset::new();
        removal.remove("data.txt");
        let removal_ops = planner(64, &[]).plan(1, "c", &removal, &blobs()).unwrap();
        assert_eq!(ops, removal_ops);
    }

    #[test]
    fn non_text_file_is_skipped() {
        let mut changes = Changeset::new();
        changes.update("blob.bin", "binary");
        let ops = planner(64, &[]).plan(1, "c", &changes, &blobs()).unwrap();
        assert!(ops.is_empty());
    }

    #[test]
    fn excluded_path_becomes_delete_without_fetch() {
        let mut changes = Changeset::new();
        changes.update("vendor/lib.rs", "not-a-blob");
        let ops = planner(64, &["vendor/**"])
            .plan(1, "c", &changes, &blobs())
            .unwrap();
        assert_eq!(ops, vec![BulkOp::Delete(DocumentId::new(1, "vendor/lib.rs"))]);
    }

    #[test]
    fn removed_paths_become_deletes() {
        let mut changes = Changeset::new();
        changes.remove("old.rs");
        let ops = planner(64, &[]).plan(4, "c", &changes, &blobs()).unwrap();
        assert_eq!(ops, vec![BulkOp::Delete(DocumentId::new(4, "old.rs"))]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut changes = Changeset::new();
        changes.update("notes.txt", "lossy");
        let ops = planner(64, &[]).plan(1, "c", &changes, &blobs()).unwrap();
        let BulkOp::Upsert(doc) = &ops[0] else {
            panic!("expected upsert");
        };
        assert_eq!(doc.content, "ok\u{fffd}!");
    }

    #[test]
    fn missing_blob_is_an_error() {
        let mut changes = Changeset::new();
        changes.update("a.rs", "nope");
        assert!(planner(64, &[]).plan(1, "c", &changes, &blobs()).is_err());
    }
}
