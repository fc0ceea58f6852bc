//! Code search indexing for sift.
//!
//! This crate keeps a full-text index of source files from git repositories and turns search
//! hits into display-ready snippets. It provides:
//!
//! - [`Indexer`], the backend contract, with an embedded Tantivy backend and an Elasticsearch
//!   backend selected by [`open_indexer`]
//! - [`BatchPlanner`], which turns a [`Changeset`] into bulk writes
//! - [`GitRepository`], which produces changesets and blob content from git
//! - [`CodeSearch`], which runs searches and renders hits

#![warn(missing_docs)]

mod batch;
mod changeset;
mod document;
mod elastic;
mod embedded;
mod error;
mod git;
mod id;
mod indexer;
mod search;
mod source;

pub use batch::{BatchPlanner, BulkOp};
pub use changeset::Changeset;
pub use document::{CodeDocument, IndexedSource};
pub use elastic::ElasticIndexer;
pub use embedded::TantivyIndexer;
pub use error::IndexError;
pub use git::GitRepository;
pub use id::DocumentId;
pub use indexer::{
    Indexer, LanguageFacet, OpenedIndexer, RawSearchResult, SearchHits, SearchQuery, open_indexer,
};
pub use search::{CodeSearch, DisplayResult, SearchPage, SearchRequest};
pub use source::{BlobSource, Classification, Classifier, DefaultClassifier, MemoryBlobSource};
