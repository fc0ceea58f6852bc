//! Search orchestration: run a query and render every hit for display.

use std::sync::Arc;

use serde::Serialize;
use sift_config::SearchSettings;
use sift_highlight::{
    HtmlMarkup, LanguageDetector, Markup, render_snippet, snippet_window, usable_spans,
};
use tracing::debug;

use crate::{
    error::IndexError,
    indexer::{Indexer, LanguageFacet, RawSearchResult, SearchQuery},
};

/// A user's search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    /// Repositories to search; empty means all.
    pub repo_ids: Vec<i64>,
    /// Language filter; empty means none.
    pub language: String,
    /// Keyword; blank means no search.
    pub keyword: String,
    /// 1-based page; 0 is treated as 1.
    pub page: usize,
    /// Results per page; `None` uses the configured page size.
    pub page_size: Option<usize>,
}

/// A hit ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayResult {
    /// Owning repository.
    pub repo_id: i64,
    /// Path within the repository.
    pub path: String,
    /// Commit the content was indexed at.
    pub commit_id: String,
    /// Indexing time in epoch seconds.
    pub updated_at: i64,
    /// Language label.
    pub language: String,
    /// Language display color.
    pub color: String,
    /// CSS class for client-side syntax highlighting.
    pub highlight_class: String,
    /// 1-based line numbers of the rendered lines.
    pub line_numbers: Vec<usize>,
    /// Rendered lines, in the markup dialect of the search.
    #[serde(skip)]
    pub lines: Vec<String>,
    /// All rendered lines joined.
    pub rendered: String,
}

/// One page of display results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    /// Total matching documents, ignoring paging.
    pub total: u64,
    /// Rendered hits on this page.
    pub results: Vec<DisplayResult>,
    /// Match counts per language.
    pub languages: Vec<LanguageFacet>,
}

/// Runs searches against an [`Indexer`] and renders the hits.
pub struct CodeSearch {
    /// The backend.
    indexer: Arc<dyn Indexer>,
    /// Highlight class lookup.
    detector: LanguageDetector,
    /// Paging, context and facet settings.
    settings: SearchSettings,
}

impl CodeSearch {
    /// Creates an orchestrator over `indexer`.
    pub fn new(indexer: Arc<dyn Indexer>, settings: SearchSettings) -> Self {
        Self {
            indexer,
            detector: LanguageDetector::new(),
            settings,
        }
    }

    /// Searches and renders hits as escaped HTML.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchPage, IndexError> {
        self.search_with(request, &HtmlMarkup)
    }

    /// Searches and renders hits with `markup`.
    ///
    /// The keyword is trimmed before use. One that is empty after trimming (including a
    /// whitespace-only keyword) returns an empty page without touching the backend, since no
    /// analyzer would produce a term from it. Hits without a usable match span are left out of
    /// the page.
    pub fn search_with<M: Markup + ?Sized>(
        &self,
        request: &SearchRequest,
        markup: &M,
    ) -> Result<SearchPage, IndexError> {
        let keyword = request.keyword.trim();
        if keyword.is_empty() {
            return Ok(SearchPage::default());
        }

        let query = SearchQuery {
            repo_ids: request.repo_ids.clone(),
            language: request.language.clone(),
            keyword: keyword.to_string(),
            page: request.page.max(1),
            page_size: request.page_size.unwrap_or(self.settings.page_size).max(1),
            facet_scope: self.settings.facet_scope,
            facet_limit: self.settings.facet_limit,
        };
        let hits = self.indexer.search(&query)?;

        let results = hits
            .results
            .into_iter()
            .filter_map(|hit| self.render(hit, markup))
            .collect();

        Ok(SearchPage {
            total: hits.total,
            results,
            languages: hits.languages,
        })
    }

    /// Windows and renders one hit.
    fn render<M: Markup + ?Sized>(&self, hit: RawSearchResult, markup: &M) -> Option<DisplayResult> {
        let spans = usable_spans(&hit.content, &hit.positions);
        let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
            debug!(repo_id = hit.repo_id, path = %hit.path, "skipping hit without usable matches");
            return None;
        };

        let window = snippet_window(&hit.content, first.start..last.end, self.settings.context_lines);
        let rendered = render_snippet(&hit.content, window, &spans, markup);

        Some(DisplayResult {
            highlight_class: self.detector.highlight_class(&hit.path),
            rendered: rendered.joined(),
            line_numbers: rendered.line_numbers,
            lines: rendered.lines,
            repo_id: hit.repo_id,
            path: hit.path,
            commit_id: hit.commit_id,
            updated_at: hit.updated_at,
            language: hit.language,
            color: hit.color,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        changeset::Changeset,
        indexer::SearchHits,
        source::BlobSource,
    };

    /// Records queries and returns canned hits.
    struct CannedIndexer {
        /// Hits returned by every search.
        hits: SearchHits,
        /// Queries received.
        queries: Mutex<Vec<SearchQuery>>,
    }

    impl CannedIndexer {
        fn new(results: Vec<RawSearchResult>) -> Arc<Self> {
            Arc::new(Self {
                hits: SearchHits {
                    total: results.len() as u64,
                    results,
                    languages: vec![LanguageFacet {
                        language: String::from("Go"),
                        color: String::from("#00ADD8"),
                        count: 1,
                    }],
                },
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<SearchQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl Indexer for CannedIndexer {
        fn index(
            &self,
            _repo_id: i64,
            _commit: &str,
            _changes: &Changeset,
            _blobs: &dyn BlobSource,
        ) -> Result<(), IndexError> {
            Ok(())
        }

        fn delete(&self, _repo_id: i64) -> Result<(), IndexError> {
            Ok(())
        }

        fn search(&self, query: &SearchQuery) -> Result<SearchHits, IndexError> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(self.hits.clone())
        }

        fn close(&self) -> Result<(), IndexError> {
            Ok(())
        }
    }

    fn hit(path: &str, content: &str, positions: Vec<std::ops::Range<usize>>) -> RawSearchResult {
        RawSearchResult {
            repo_id: 1,
            path: path.to_string(),
            commit_id: String::from("abc"),
            content: content.to_string(),
            updated_at: 10,
            language: String::from("Go"),
            color: String::from("#00ADD8"),
            positions,
        }
    }

    fn request(keyword: &str) -> SearchRequest {
        SearchRequest {
            keyword: keyword.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_keyword_skips_backend() {
        let indexer = CannedIndexer::new(vec![]);
        let search = CodeSearch::new(indexer.clone(), SearchSettings::default());
        for keyword in ["", "   ", "\t\n"] {
            let page = search.search(&request(keyword)).unwrap();
            assert_eq!(page, SearchPage::default());
        }
        assert!(indexer.queries().is_empty());
    }

    #[test]
    fn renders_worked_example() {
        let content = "line1\nline2\nMATCHhere\nline4\nline5\nline6\n";
        let indexer = CannedIndexer::new(vec![hit("main.go", content, vec![12..17])]);
        let search = CodeSearch::new(indexer, SearchSettings::default());

        let page = search.search(&request("MATCH")).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.languages.len(), 1);

        let result = &page.results[0];
        assert_eq!(result.line_numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(result.highlight_class, "go");
        assert!(result.rendered.contains("<li><span class='active'>MATCH</span>here\n</li>"));
        assert!(result.rendered.ends_with("<li>line5</li>"));
        assert!(!result.rendered.contains("line6"));
    }

    #[test]
    fn hits_without_usable_spans_are_skipped() {
        let indexer = CannedIndexer::new(vec![
            hit("empty.go", "package main", vec![]),
            hit("broken.go", "añb", vec![2..3, 9..12]),
            hit("ok.go", "package main", vec![0..7]),
        ]);
        let search = CodeSearch::new(indexer, SearchSettings::default());
        let page = search.search(&request("package")).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].path, "ok.go");
    }

    #[test]
    fn request_is_normalized_into_query() {
        let indexer = CannedIndexer::new(vec![]);
        let settings = SearchSettings {
            page_size: 25,
            ..Default::default()
        };
        let search = CodeSearch::new(indexer.clone(), settings);
        let request = SearchRequest {
            repo_ids: vec![3],
            language: String::from("Rust"),
            keyword: String::from("  foo  "),
            page: 0,
            page_size: None,
        };
        search.search(&request).unwrap();

        let queries = indexer.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].keyword, "foo");
        assert_eq!(queries[0].page, 1);
        assert_eq!(queries[0].page_size, 25);
        assert_eq!(queries[0].repo_ids, vec![3]);
        assert_eq!(queries[0].language, "Rust");
    }

    #[test]
    fn display_result_serializes_without_raw_lines() {
        let indexer = CannedIndexer::new(vec![hit("a.go", "x := 1", vec![0..1])]);
        let search = CodeSearch::new(indexer, SearchSettings::default());
        let page = search.search(&request("x")).unwrap();
        let value = serde_json::to_value(&page).unwrap();
        let result = &value["results"][0];
        assert_eq!(result["path"], "a.go");
        assert_eq!(result["line_numbers"], serde_json::json!([1]));
        assert!(result.get("lines").is_none());
        assert_eq!(value["languages"][0]["language"], "Go");
    }
}
