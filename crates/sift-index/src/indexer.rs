//! The backend contract shared by every full-text engine.

use std::{ops::Range, path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_config::{BackendKind, Config, FacetScope};
use sift_highlight::language_color;
use tracing::info;

use crate::{
    batch::BatchPlanner, changeset::Changeset, elastic::ElasticIndexer, embedded::TantivyIndexer,
    error::IndexError, source::BlobSource,
};

/// Name of the language terms aggregation in backend requests and responses.
pub(crate) const LANGUAGE_AGG: &str = "language";

/// A full-text engine that stores code documents and answers searches.
///
/// Implementations are shared between threads and hold their connection or index handles for
/// the life of the process.
pub trait Indexer: Send + Sync {
    /// Applies one commit's changes for a repository as a single batch.
    fn index(
        &self,
        repo_id: i64,
        commit: &str,
        changes: &Changeset,
        blobs: &dyn BlobSource,
    ) -> Result<(), IndexError>;

    /// Removes every document of a repository.
    fn delete(&self, repo_id: i64) -> Result<(), IndexError>;

    /// Runs a search and returns one page of hits plus language facets.
    fn search(&self, query: &SearchQuery) -> Result<SearchHits, IndexError>;

    /// Releases backend resources.
    fn close(&self) -> Result<(), IndexError>;
}

/// What to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Repositories to search; empty means all.
    pub repo_ids: Vec<i64>,
    /// Language to restrict results to; empty means no filter.
    pub language: String,
    /// Free-text keyword, matched fuzzily against file content.
    pub keyword: String,
    /// 1-based page number.
    pub page: usize,
    /// Results per page.
    pub page_size: usize,
    /// Which result set the language facets describe.
    pub facet_scope: FacetScope,
    /// Maximum number of language facets.
    pub facet_limit: usize,
}

impl SearchQuery {
    /// Creates a query for `keyword` over all repositories, first page of ten.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            repo_ids: Vec::new(),
            language: String::new(),
            keyword: keyword.into(),
            page: 1,
            page_size: 10,
            facet_scope: FacetScope::default(),
            facet_limit: 10,
        }
    }

    /// Offset of the first hit on the requested page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Whether facets need their own query without the language filter.
    pub(crate) fn needs_separate_facets(&self) -> bool {
        !self.language.is_empty() && self.facet_scope == FacetScope::Unfiltered
    }
}

/// One page of search hits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    /// Total matching documents, ignoring paging.
    pub total: u64,
    /// Hits on the requested page.
    pub results: Vec<RawSearchResult>,
    /// Match counts per language.
    pub languages: Vec<LanguageFacet>,
}

/// A matching file with the byte ranges of its matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSearchResult {
    /// Owning repository.
    pub repo_id: i64,
    /// Path within the repository.
    pub path: String,
    /// Commit the content was indexed at.
    pub commit_id: String,
    /// Full file content.
    pub content: String,
    /// Indexing time in epoch seconds.
    pub updated_at: i64,
    /// Language label.
    pub language: String,
    /// Display color of the language.
    pub color: String,
    /// Matched byte ranges into `content`, ascending.
    pub positions: Vec<Range<usize>>,
}

/// Number of matching documents in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageFacet {
    /// Language label.
    pub language: String,
    /// Display color.
    pub color: String,
    /// Matching documents.
    pub count: u64,
}

/// One bucket of a terms aggregation.
#[derive(Debug, Deserialize)]
struct Bucket {
    /// Bucket key.
    key: Value,
    /// Documents in the bucket.
    doc_count: u64,
}

/// Body of a terms aggregation result.
#[derive(Debug, Deserialize)]
struct TermsAggregation {
    /// Buckets, already ordered by the engine.
    #[serde(default)]
    buckets: Vec<Bucket>,
}

/// Extracts language facets from an aggregation result object.
///
/// Both Elasticsearch and Tantivy serialize terms aggregations as
/// `{"language": {"buckets": [{"key": ..., "doc_count": ...}]}}`. Missing aggregations yield
/// no facets.
pub(crate) fn parse_language_facets(aggregations: &Value) -> Result<Vec<LanguageFacet>, IndexError> {
    let Some(agg) = aggregations.get(LANGUAGE_AGG) else {
        return Ok(Vec::new());
    };
    let terms: TermsAggregation = serde_json::from_value(agg.clone())?;
    Ok(terms
        .buckets
        .into_iter()
        .map(|bucket| {
            let language = match bucket.key {
                Value::String(s) => s,
                other => other.to_string(),
            };
            LanguageFacet {
                color: language_color(&language).to_string(),
                language,
                count: bucket.doc_count,
            }
        })
        .collect())
}

/// A backend opened from configuration.
pub struct OpenedIndexer {
    /// The backend.
    pub indexer: Arc<dyn Indexer>,
    /// Whether the index existed before it was opened.
    pub existed: bool,
}

/// Opens the backend selected by `[index] backend`, creating its index if needed.
pub fn open_indexer(config: &Config) -> Result<OpenedIndexer, IndexError> {
    let planner = BatchPlanner::from_config(config)?;
    let (indexer, existed): (Arc<dyn Indexer>, bool) = match config.index.backend {
        BackendKind::Tantivy => {
            let path = config.index_directory().ok_or_else(|| IndexError::OpenIndex {
                path: PathBuf::new(),
                message: String::from("no index directory could be determined"),
            })?;
            let (indexer, existed) = TantivyIndexer::open(&path, planner)?;
            (Arc::new(indexer), existed)
        }
        BackendKind::Elasticsearch => {
            let (indexer, existed) = ElasticIndexer::open(&config.elasticsearch, planner)?;
            (Arc::new(indexer), existed)
        }
    };
    if !existed {
        info!(backend = %config.index.backend, "created new index");
    }
    Ok(OpenedIndexer { indexer, existed })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn offset_is_zero_based() {
        let mut query = SearchQuery::new("foo");
        assert_eq!(query.offset(), 0);
        query.page = 3;
        query.page_size = 20;
        assert_eq!(query.offset(), 40);
        query.page = 0;
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn separate_facets_only_with_unfiltered_language_filter() {
        let mut query = SearchQuery::new("foo");
        assert!(!query.needs_separate_facets());
        query.language = String::from("Go");
        assert!(query.needs_separate_facets());
        query.facet_scope = FacetScope::Filtered;
        assert!(!query.needs_separate_facets());
    }

    #[test]
    fn parses_terms_buckets() {
        let aggs = json!({
            "language": {
                "doc_count_error_upper_bound": 0,
                "sum_other_doc_count": 0,
                "buckets": [
                    {"key": "Go", "doc_count": 4},
                    {"key": "Rust", "doc_count": 2},
                ]
            }
        });
        let facets = parse_language_facets(&aggs).unwrap();
        assert_eq!(
            facets,
            vec![
                LanguageFacet {
                    language: String::from("Go"),
                    color: String::from("#00ADD8"),
                    count: 4,
                },
                LanguageFacet {
                    language: String::from("Rust"),
                    color: String::from("#dea584"),
                    count: 2,
                },
            ]
        );
    }

    #[test]
    fn missing_aggregation_has_no_facets() {
        assert!(parse_language_facets(&json!({})).unwrap().is_empty());
    }
}
