//! Parsing Elasticsearch responses.

use std::{collections::HashMap, ops::Range};

use serde::Deserialize;
use serde_json::Value;
use sift_highlight::{char_to_byte_spans, language_color};
use tracing::debug;

use crate::{
    document::IndexedSource,
    error::IndexError,
    id::DocumentId,
    indexer::{RawSearchResult, SearchHits, parse_language_facets},
};

/// Top level of a `_search` response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Matching documents.
    hits: HitsEnvelope,
    /// Aggregation results, if requested.
    #[serde(default)]
    aggregations: Value,
}

/// The `hits` object.
#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    /// Total number of matches.
    total: TotalHits,
    /// Hits on this page.
    #[serde(default)]
    hits: Vec<Hit>,
}

/// Total hit count, as a bare number or a `{value, relation}` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    /// Pre-7.x form.
    Count(u64),
    /// 7.x form.
    Object {
        /// The count.
        value: u64,
    },
}

impl TotalHits {
    /// Returns the count.
    fn value(&self) -> u64 {
        match self {
            Self::Count(value) | Self::Object { value } => *value,
        }
    }
}

/// One hit.
#[derive(Debug, Deserialize)]
struct Hit {
    /// Document key.
    #[serde(rename = "_id")]
    id: String,
    /// Stored document body.
    #[serde(rename = "_source")]
    source: IndexedSource,
    /// Highlight fragments per field.
    #[serde(default)]
    highlight: HashMap<String, Vec<String>>,
}

impl SearchResponse {
    /// Parses a response body.
    pub fn from_value(value: Value) -> Result<Self, IndexError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Converts the response into hits with byte-offset match positions.
    ///
    /// Hits with an undecodable id are dropped; malformed highlight fragments are ignored.
    pub fn into_hits(self) -> Result<SearchHits, IndexError> {
        let languages = parse_language_facets(&self.aggregations)?;
        let total = self.hits.total.value();

        let results = self
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| {
                let id: DocumentId = match hit.id.parse() {
                    Ok(id) => id,
                    Err(e) => {
                        debug!(id = %hit.id, error = %e, "skipping hit with malformed id");
                        return None;
                    }
                };
                let char_spans: Vec<Range<usize>> = hit
                    .highlight
                    .get("content")
                    .into_iter()
                    .flatten()
                    .flat_map(|fragment| parse_fragment(fragment))
                    .collect();
                let positions = char_to_byte_spans(&hit.source.content, &char_spans);
                let doc = hit.source.into_document(id);

                Some(RawSearchResult {
                    repo_id: doc.id.repo_id,
                    path: doc.id.path,
                    commit_id: doc.commit_id,
                    color: language_color(&doc.language).to_string(),
                    language: doc.language,
                    updated_at: doc.updated_at,
                    content: doc.content,
                    positions,
                })
            })
            .collect();

        Ok(SearchHits {
            total,
            results,
            languages,
        })
    }
}

/// Parses one offset-highlighter fragment into character spans.
///
/// Fragments look like `fragStart:hitStart-hitEnd,hitStart-hitEnd:fragEnd`. Empty fields are
/// ignored; a fragment without exactly three fields yields nothing, and pairs that are not two
/// integers are skipped.
pub fn parse_fragment(fragment: &str) -> Vec<Range<usize>> {
    let fields: Vec<&str> = fragment.split(':').filter(|f| !f.is_empty()).collect();
    let [_, hits, _] = fields[..] else {
        debug!(fragment, "ignoring malformed highlight fragment");
        return Vec::new();
    };

    hits.split(',')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let bounds: Vec<&str> = pair.split('-').filter(|b| !b.is_empty()).collect();
            let [start, end] = bounds[..] else {
                return None;
            };
            Some(start.parse().ok()?..end.parse().ok()?)
        })
        .collect()
}
