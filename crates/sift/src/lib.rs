//! sift: code search over git repositories.
//!
//! sift indexes the files of git repositories at a commit, keeps the index current as new
//! commits arrive, and answers keyword searches with highlighted, line-numbered snippets and
//! per-language match counts. The index lives either in an embedded Tantivy directory or in an
//! Elasticsearch cluster.

#![warn(missing_docs)]

pub mod cli;
