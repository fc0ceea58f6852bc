//! Remote backend talking to an Elasticsearch cluster over HTTP.

mod request;
mod response;

use std::time::Duration;

use reqwest::{
    StatusCode,
    blocking::{Client, RequestBuilder},
    header::CONTENT_TYPE,
};
use serde_json::Value;
use sift_config::ElasticsearchSettings;
use tracing::{debug, info, warn};

use self::{
    request::{SearchParts, bulk_body, delete_repo_body, index_mapping, search_body},
    response::SearchResponse,
};
use crate::{
    batch::BatchPlanner,
    changeset::Changeset,
    error::IndexError,
    indexer::{Indexer, SearchHits, SearchQuery},
    source::BlobSource,
};

/// Elasticsearch-backed [`Indexer`].
pub struct ElasticIndexer {
    /// HTTP client shared by all requests.
    client: Client,
    /// Cluster URL without a trailing slash.
    base_url: String,
    /// Name of the index holding code documents.
    index_name: String,
    /// Changeset to bulk operation planning.
    planner: BatchPlanner,
}

impl ElasticIndexer {
    /// Connects to the cluster and creates the index if it does not exist.
    ///
    /// Returns the indexer and whether the index already existed.
    pub fn open(
        settings: &ElasticsearchSettings,
        planner: BatchPlanner,
    ) -> Result<(Self, bool), IndexError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let indexer = Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            index_name: settings.index_name.clone(),
            planner,
        };
        let existed = indexer.init()?;
        Ok((indexer, existed))
    }

    /// Ensures the index exists, returning whether it already did.
    fn init(&self) -> Result<bool, IndexError> {
        let url = self.index_url("");
        let status = self.client.head(&url).send()?.status();
        if status.is_success() {
            debug!(index = %self.index_name, "index exists");
            return Ok(true);
        }
        if status != StatusCode::NOT_FOUND {
            return Err(IndexError::Backend(format!(
                "checking index {} returned {status}",
                self.index_name
            )));
        }

        let created = Self::send_json(self.client.put(&url).json(&index_mapping()))?;
        if created.get("acknowledged").and_then(Value::as_bool) != Some(true) {
            return Err(IndexError::Backend(format!(
                "creation of index {} was not acknowledged",
                self.index_name
            )));
        }
        info!(index = %self.index_name, "created index");
        Ok(false)
    }

    /// Returns `{base}/{index}{suffix}`.
    fn index_url(&self, suffix: &str) -> String {
        format!("{}/{}{suffix}", self.base_url, self.index_name)
    }

    /// Sends a request and decodes the JSON body, turning error statuses into errors.
    fn send_json(request: RequestBuilder) -> Result<Value, IndexError> {
        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(IndexError::Backend(format!("{status}: {text}")));
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Runs one search request.
    fn run_search(&self, body: &Value) -> Result<SearchHits, IndexError> {
        let value = Self::send_json(self.client.post(self.index_url("/_search")).json(body))?;
        SearchResponse::from_value(value)?.into_hits()
    }
}

/// Returns the first item error of a bulk response, if any item failed.
fn bulk_failure(response: &Value) -> Option<String> {
    if response.get("errors").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    let first = response
        .get("items")
        .and_then(Value::as_array)
        .and_then(|items| {
            items
                .iter()
                .filter_map(|item| item.as_object()?.values().next())
                .find_map(|result| {
                    let error = result.get("error")?;
                    let id = result.get("_id").and_then(Value::as_str).unwrap_or("?");
                    let reason = error
                        .get("reason")
                        .and_then(Value::as_str)
                        .map_or_else(|| error.to_string(), str::to_string);
                    Some(format!("{id}: {reason}"))
                })
        });
    Some(first.unwrap_or_else(|| String::from("bulk request reported errors")))
}

impl Indexer for ElasticIndexer {
    fn index(
        &self,
        repo_id: i64,
        commit: &str,
        changes: &Changeset,
        blobs: &dyn BlobSource,
    ) -> Result<(), IndexError> {
        let ops = self.planner.plan(repo_id, commit, changes, blobs)?;
        if ops.is_empty() {
            return Ok(());
        }

        let body = bulk_body(&self.index_name, &ops)?;
        let response = Self::send_json(
            self.client
                .post(format!("{}/_bulk", self.base_url))
                .header(CONTENT_TYPE, "application/x-ndjson")
                .body(body),
        )?;
        if let Some(failure) = bulk_failure(&response) {
            warn!(repo_id, commit, %failure, "bulk indexing failed");
            return Err(IndexError::Backend(failure));
        }

        info!(repo_id, commit, operations = ops.len(), "indexed changeset");
        Ok(())
    }

    fn delete(&self, repo_id: i64) -> Result<(), IndexError> {
        let response = Self::send_json(
            self.client
                .post(self.index_url("/_delete_by_query"))
                .json(&delete_repo_body(repo_id)),
        )?;
        let deleted = response.get("deleted").and_then(Value::as_u64).unwrap_or(0);
        info!(repo_id, deleted, "deleted repository from index");
        Ok(())
    }

    fn search(&self, query: &SearchQuery) -> Result<SearchHits, IndexError> {
        if query.needs_separate_facets() {
            let counts = self.run_search(&search_body(
                query,
                SearchParts {
                    filter_language: false,
                    hits: false,
                    facets: true,
                },
            ))?;
            let mut page = self.run_search(&search_body(
                query,
                SearchParts {
                    filter_language: true,
                    hits: true,
                    facets: false,
                },
            ))?;
            page.languages = counts.languages;
            return Ok(page);
        }

        self.run_search(&search_body(
            query,
            SearchParts {
                filter_language: true,
                hits: true,
                facets: true,
            },
        ))
    }

    fn close(&self) -> Result<(), IndexError> {
        debug!(index = %self.index_name, "closing elasticsearch client");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sift_config::PathFilter;

    use super::*;
    use crate::source::DefaultClassifier;

    #[test]
    fn successful_bulk_has_no_failure() {
        let response = json!({ "errors": false, "items": [] });
        assert!(bulk_failure(&response).is_none());
    }

    #[test]
    fn bulk_failure_names_first_failed_item() {
        let response = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "1_a.rs", "status": 201 } },
                { "index": {
                    "_id": "1_b.rs",
                    "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "bad field" }
                } },
            ]
        });
        assert_eq!(bulk_failure(&response).unwrap(), "1_b.rs: bad field");
    }

    #[test]
    fn bulk_failure_without_item_details() {
        let response = json!({ "errors": true });
        assert_eq!(
            bulk_failure(&response).unwrap(),
            "bulk request reported errors"
        );
        let response = json!({ "errors": true, "items": [] });
        assert_eq!(
            bulk_failure(&response).unwrap(),
            "bulk request reported errors"
        );
    }

    #[test]
    fn open_fails_without_a_cluster() {
        let settings = ElasticsearchSettings {
            url: String::from("http://127.0.0.1:1"),
            index_name: String::from("codes"),
            timeout_secs: 1,
        };
        let planner = BatchPlanner::new(
            1024,
            PathFilter::allow_all(),
            Box::new(DefaultClassifier::new()),
        );
        assert!(matches!(
            ElasticIndexer::open(&settings, planner),
            Err(IndexError::Http(_))
        ));
    }
}
