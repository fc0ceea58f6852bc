//! Document identity: `(repository, path)` encoded as a single backend key.

use std::{fmt, str::FromStr};

/// Separates the encoded repository id from the file path.
const SEPARATOR: char = '_';

/// Digits used for base-36 repository ids.
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifies one indexed file.
///
/// The key form is `base36(repo_id) + "_" + path`. Base-36 digits never contain the separator,
/// so parsing splits on the first `_` and paths may contain `_` freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId {
    /// Repository the file belongs to.
    pub repo_id: i64,
    /// Path of the file within the repository.
    pub path: String,
}

impl DocumentId {
    /// Creates an id for `path` in repository `repo_id`.
    pub fn new(repo_id: i64, path: impl Into<String>) -> Self {
        Self {
            repo_id,
            path: path.into(),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", to_base36(self.repo_id), self.path)
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (repo, path) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| format!("document id without separator: {s}"))?;
        let repo_id =
            i64::from_str_radix(repo, 36).map_err(|e| format!("bad repository in {s}: {e}"))?;
        Ok(Self::new(repo_id, path))
    }
}

/// Formats a repository id in lowercase base 36.
fn to_base36(value: i64) -> String {
    let negative = value < 0;
    let mut n = value.unsigned_abs();
    let mut digits = Vec::new();
    loop {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    if negative {
        digits.push(b'-');
    }
    digits.iter().rev().map(|&d| char::from(d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_repository_in_base36() {
        assert_eq!(DocumentId::new(0, "a.rs").to_string(), "0_a.rs");
        assert_eq!(DocumentId::new(35, "a.rs").to_string(), "z_a.rs");
        assert_eq!(DocumentId::new(36, "src/main.go").to_string(), "10_src/main.go");
        assert_eq!(DocumentId::new(-46655, "x").to_string(), "-zzz_x");
    }

    #[test]
    fn parses_back_with_underscores_in_path() {
        let id: DocumentId = "2s_src/my_module/lib_test.rs".parse().unwrap();
        assert_eq!(id, DocumentId::new(100, "src/my_module/lib_test.rs"));
    }

    #[test]
    fn round_trips_extreme_repository_ids() {
        for repo_id in [i64::MIN + 1, -1, 0, 1, 12345, i64::MAX] {
            let id = DocumentId::new(repo_id, "dir/file_name.c");
            assert_eq!(id.to_string().parse::<DocumentId>().unwrap(), id);
        }
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("no-separator".parse::<DocumentId>().is_err());
        assert!("!!_path".parse::<DocumentId>().is_err());
    }
}
