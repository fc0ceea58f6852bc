//! Reading changesets and blobs from a git repository with the `git` command.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use tracing::debug;

use crate::{changeset::Changeset, error::IndexError, source::BlobSource};

/// Tree entry modes for regular and executable files. Symlinks and submodules are not indexed.
const FILE_MODES: [&str; 2] = ["100644", "100755"];

/// A git repository on local disk.
#[derive(Debug, Clone)]
pub struct GitRepository {
    /// Working tree or bare repository directory.
    path: PathBuf,
}

impl GitRepository {
    /// Opens the repository at `path`, failing if git does not recognize it.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        let repo = Self {
            path: path.to_path_buf(),
        };
        repo.git(&["rev-parse", "--git-dir"])?;
        Ok(repo)
    }

    /// Returns the repository directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves a revision to a full commit id.
    pub fn resolve(&self, rev: &str) -> Result<String, IndexError> {
        let target = format!("{rev}^{{commit}}");
        let out = self.git(&["rev-parse", "--verify", "--quiet", &target])?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }

    /// Lists every indexable file at `commit` as an update.
    pub fn full_changeset(&self, commit: &str) -> Result<Changeset, IndexError> {
        let out = self.git(&["ls-tree", "-r", "-z", "--full-tree", commit])?;
        let changes = parse_ls_tree(&out);
        debug!(commit, files = changes.len(), "listed tree");
        Ok(changes)
    }

    /// Lists the files that changed between two commits.
    pub fn diff_changeset(&self, from: &str, to: &str) -> Result<Changeset, IndexError> {
        let out = self.git(&["diff-tree", "-r", "-z", "--no-renames", from, to])?;
        let changes = parse_diff_tree(&out);
        debug!(from, to, files = changes.len(), "diffed trees");
        Ok(changes)
    }

    /// Runs a git subcommand in the repository and returns its stdout.
    fn git(&self, args: &[&str]) -> Result<Vec<u8>, IndexError> {
        let command = args.first().copied().unwrap_or_default().to_string();
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .output()
            .map_err(|e| IndexError::Git {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(IndexError::Git {
                command,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl BlobSource for GitRepository {
    fn blob_size(&self, blob: &str) -> Result<u64, IndexError> {
        let out = self.git(&["cat-file", "-s", blob])?;
        let text = String::from_utf8_lossy(&out);
        text.trim().parse().map_err(|_| IndexError::Blob {
            blob: blob.to_string(),
            message: format!("unexpected cat-file size output: {:?}", text.trim()),
        })
    }

    fn blob_content(&self, blob: &str) -> Result<Vec<u8>, IndexError> {
        self.git(&["cat-file", "blob", blob])
    }
}

/// Parses `git ls-tree -r -z` output into a changeset of updates.
///
/// Records look like `<mode> <type> <object>\t<path>` and are NUL-terminated.
fn parse_ls_tree(out: &[u8]) -> Changeset {
    let mut changes = Changeset::new();
    for record in out.split(|&b| b == 0).filter(|r| !r.is_empty()) {
        let record = String::from_utf8_lossy(record);
        let Some((meta, path)) = record.split_once('\t') else {
            continue;
        };
        let mut fields = meta.split(' ');
        let (Some(mode), Some("blob"), Some(object)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        if FILE_MODES.contains(&mode) {
            changes.update(path, object);
        }
    }
    changes
}

/// Parses `git diff-tree -r -z` raw output into a changeset.
///
/// Each change is a header `:<old mode> <new mode> <old sha> <new sha> <status>` followed by a
/// path, both NUL-terminated. Deleted files, and files that stopped being regular files, are
/// removals; everything else with a regular new mode is an update to the new blob.
fn parse_diff_tree(out: &[u8]) -> Changeset {
    let mut changes = Changeset::new();
    let mut fields = out.split(|&b| b == 0).filter(|r| !r.is_empty());

    while let Some(header) = fields.next() {
        let header = String::from_utf8_lossy(header);
        let Some(header) = header.strip_prefix(':') else {
            // The first line may be the commit id when diffing a single commit.
            continue;
        };
        let Some(path) = fields.next() else {
            break;
        };
        let path = String::from_utf8_lossy(path).into_owned();

        let parts: Vec<&str> = header.split(' ').collect();
        let [_, new_mode, _, new_sha, status] = parts[..] else {
            continue;
        };
        if status.starts_with('D') || !FILE_MODES.contains(&new_mode) {
            changes.remove(path);
        } else {
            changes.update(path, new_sha);
        }
    }
    changes
}
