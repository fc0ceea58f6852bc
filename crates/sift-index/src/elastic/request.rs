//! Request bodies sent to Elasticsearch.

use serde_json::{Value, json};

use crate::{
    batch::BulkOp,
    error::IndexError,
    indexer::{LANGUAGE_AGG, SearchQuery},
};

/// Index creation body: field mappings for code documents.
pub fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "repo_id": { "type": "long", "index": true },
                "content": { "type": "text", "index": true },
                "commit_id": { "type": "keyword", "index": true },
                "language": { "type": "keyword", "index": true },
                "updated_at": { "type": "long", "index": true },
            }
        }
    })
}

/// Encodes bulk operations as newline-delimited JSON.
///
/// Upserts are `index` actions followed by the document source; deletes are bare `delete`
/// actions. The body ends with a newline as the bulk API requires.
pub fn bulk_body(index_name: &str, ops: &[BulkOp]) -> Result<String, IndexError> {
    let mut body = String::new();
    for op in ops {
        let id = op.id().to_string();
        match op {
            BulkOp::Upsert(doc) => {
                let action = json!({ "index": { "_index": index_name, "_id": id } });
                body.push_str(&serde_json::to_string(&action)?);
                body.push('\n');
                body.push_str(&serde_json::to_string(&doc.source())?);
                body.push('\n');
            }
            BulkOp::Delete(_) => {
                let action = json!({ "delete": { "_index": index_name, "_id": id } });
                body.push_str(&serde_json::to_string(&action)?);
                body.push('\n');
            }
        }
    }
    Ok(body)
}

/// Body removing every document of a repository.
pub fn delete_repo_body(repo_id: i64) -> Value {
    json!({ "query": { "terms": { "repo_id": [repo_id] } } })
}

/// What a search request should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParts {
    /// Apply the language filter.
    pub filter_language: bool,
    /// Return a page of highlighted hits.
    pub hits: bool,
    /// Return the language aggregation.
    pub facets: bool,
}

/// Builds a search body for `query`.
///
/// The keyword runs as a lenient `query_string` with automatic fuzziness on `content`. Hits
/// are sorted by repository and highlighted with offsets instead of markup.
pub fn search_body(query: &SearchQuery, parts: SearchParts) -> Value {
    let mut must = vec![json!({
        "query_string": {
            "query": query.keyword,
            "fields": ["content"],
            "fuzziness": "AUTO",
            "analyze_wildcard": true,
            "lenient": true,
        }
    })];
    if !query.repo_ids.is_empty() {
        must.push(json!({ "terms": { "repo_id": query.repo_ids } }));
    }
    if parts.filter_language && !query.language.is_empty() {
        must.push(json!({ "match": { "language": query.language } }));
    }

    let mut body = json!({ "query": { "bool": { "must": must } } });

    if parts.facets {
        body["aggs"] = json!({
            LANGUAGE_AGG: {
                "terms": {
                    "field": "language",
                    "size": query.facet_limit,
                    "order": { "_count": "desc" },
                }
            }
        });
    }

    if parts.hits {
        body["highlight"] = json!({
            "fields": {
                "content": {
                    "type": "experimental",
                    "options": { "return_offsets": true },
                }
            }
        });
        body["sort"] = json!([{ "repo_id": { "order": "asc" } }]);
        body["from"] = json!(query.offset());
        body["size"] = json!(query.page_size);
        body["track_total_hits"] = json!(true);
    } else {
        body["size"] = json!(0);
    }

    body
}
