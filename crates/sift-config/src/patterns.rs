//! Include/exclude pattern compilation and matching.
//!
//! Compiles the configured glob patterns into matchers that decide which repository paths
//! are indexed.

use std::path::Path;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use crate::ConfigError;

/// Compiled include/exclude patterns for repository paths.
#[derive(Debug, Clone)]
pub struct PathFilter {
    /// Paths must match at least one of these.
    include: GlobSet,
    /// Paths matching any of these are rejected.
    exclude: GlobSet,
}

impl PathFilter {
    /// Compiles include and exclude patterns.
    pub fn compile(include: &[String], exclude: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            include: build_set(include, "include")?,
            exclude: build_set(exclude, "exclude")?,
        })
    }

    /// A filter that accepts every path.
    pub fn allow_all() -> Self {
        Self {
            include: GlobSet::empty(),
            exclude: GlobSet::empty(),
        }
    }

    /// Checks whether a repository-relative path should be indexed.
    ///
    /// An empty include set accepts everything.
    pub fn matches(&self, path: &str) -> bool {
        let path = Path::new(path);
        let included = self.include.is_empty() || self.include.is_match(path);
        included && !self.exclude.is_match(path)
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::allow_all()
    }
}

/// Builds a glob set from patterns, naming the list in errors.
fn build_set(patterns: &[String], kind: &str) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(compile_glob(pattern)?);
    }
    builder.build().map_err(|source| ConfigError::InvalidPattern {
        pattern: format!("<combined {kind} patterns>"),
        source,
    })
}

/// Compiles a single glob. `*` does not cross directory separators.
fn compile_glob(pattern: &str) -> Result<Glob, ConfigError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
