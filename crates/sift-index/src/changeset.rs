//! File changes between two commits of a repository.

use std::collections::{BTreeMap, BTreeSet};

/// The files to (re)index and the files to drop for one commit.
///
/// Consumers must not rely on the iteration order of either collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    /// Added or modified files: path to blob id.
    pub updates: BTreeMap<String, String>,
    /// Deleted file paths.
    pub removed: BTreeSet<String>,
}

impl Changeset {
    /// Creates an empty changeset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `path` now has content `blob`.
    pub fn update(&mut self, path: impl Into<String>, blob: impl Into<String>) {
        let path = path.into();
        self.removed.remove(&path);
        self.updates.insert(path, blob.into());
    }

    /// Records that `path` was deleted.
    pub fn remove(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.updates.remove(&path);
        self.removed.insert(path);
    }

    /// Returns true if the changeset touches no files.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.removed.is_empty()
    }

    /// Number of files touched.
    pub fn len(&self) -> usize {
        self.updates.len() + self.removed.len()
    }
}
