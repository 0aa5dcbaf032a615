//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `DocumentStore`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    http::StatusCode,
    indices::{
        IndicesCreateParts, IndicesDeleteParts, IndicesDeleteTemplateParts, IndicesExistsParts,
        IndicesGetMappingParts, IndicesPutMappingParts, IndicesPutTemplateParts,
    },
    BulkParts, DeleteParts, ExistsParts, GetParts, IndexParts, MgetParts, OpenSearch, SearchParts,
    UpdateParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::StoreError;
use crate::interfaces::DocumentStore;
use crate::types::{
    BulkAction, BulkDocument, BulkItemResult, BulkSummary, SearchHit, SearchResponse,
};

/// OpenSearch implementation of [`DocumentStore`].
///
/// # Example
///
/// ```ignore
/// use search_store::OpenSearchProvider;
///
/// let provider = OpenSearchProvider::new("http://localhost:9200").await?;
/// let id = provider
///     .index_document("events", None, &serde_json::json!({"field": "value"}))
///     .await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
}

impl OpenSearchProvider {
    /// Create a new provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(StoreError)` - If connection setup fails
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let parsed_url = Url::parse(url).map_err(|e| StoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch provider");

        Ok(Self { client })
    }

    /// Consume a failed response into a log line and an error message.
    async fn response_failure(context: &str, response: Response) -> String {
        let status = response.status_code();
        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, context = context, "Request failed");
        format!("{} failed with status {}: {}", context, status, body)
    }

    /// Build the newline-delimited bulk body for `count` increments of one
    /// document: the same index action repeated with an empty source.
    fn bulk_increment_lines(id: &str, count: u64) -> Vec<Value> {
        let mut lines = Vec::with_capacity(count as usize * 2);
        for _ in 0..count {
            lines.push(json!({ "index": { "_id": id } }));
            lines.push(json!({}));
        }
        lines
    }

    /// Build the newline-delimited bulk body for a document batch.
    fn bulk_index_lines(docs: &[BulkDocument]) -> Vec<Value> {
        let mut lines = Vec::with_capacity(docs.len() * 2);
        for doc in docs {
            match &doc.id {
                Some(id) => lines.push(json!({ "index": { "_id": id } })),
                None => lines.push(json!({ "index": {} })),
            }
            lines.push(doc.source.clone());
        }
        lines
    }

    /// Build the newline-delimited bulk body for a mixed action batch.
    fn bulk_action_lines(actions: &[BulkAction]) -> Vec<Value> {
        let mut lines = Vec::with_capacity(actions.len() * 2);
        for action in actions {
            match action {
                BulkAction::Index { id: Some(id), source } => {
                    lines.push(json!({ "index": { "_id": id } }));
                    lines.push(source.clone());
                }
                BulkAction::Index { id: None, source } => {
                    lines.push(json!({ "index": {} }));
                    lines.push(source.clone());
                }
                BulkAction::Update { id, doc } => {
                    lines.push(json!({ "update": { "_id": id } }));
                    lines.push(json!({ "doc": doc }));
                }
            }
        }
        lines
    }

    /// Extract the allocated version numbers from a bulk increment response.
    ///
    /// Item failures fail the whole batch: per the counter contract no
    /// partial credit is given, and versions the engine may already have
    /// burned are simply lost.
    fn parse_bulk_versions(body: &Value) -> Result<Vec<u64>, StoreError> {
        if body["errors"].as_bool().unwrap_or(false) {
            return Err(StoreError::bulk(
                "bulk increment reported item failures; no versions credited",
            ));
        }
        let items = body["items"]
            .as_array()
            .ok_or_else(|| StoreError::parse("missing items in bulk response"))?;

        let mut versions = Vec::with_capacity(items.len());
        for item in items {
            let version = item["index"]["_version"]
                .as_u64()
                .ok_or_else(|| StoreError::parse("missing _version in bulk response item"))?;
            versions.push(version);
        }
        Ok(versions)
    }

    /// Convert a bulk index response into a per-item summary.
    fn parse_bulk_summary(body: &Value) -> Result<BulkSummary, StoreError> {
        let raw_items = body["items"]
            .as_array()
            .ok_or_else(|| StoreError::parse("missing items in bulk response"))?;

        let mut items = Vec::with_capacity(raw_items.len());
        let mut succeeded = 0;
        let mut failed = 0;

        for raw in raw_items {
            let op = raw
                .get("index")
                .or_else(|| raw.get("create"))
                .or_else(|| raw.get("update"))
                .cloned()
                .unwrap_or(Value::Null);
            let id = op["_id"].as_str().map(str::to_string);
            let status = op["status"].as_u64().unwrap_or(0);
            let success = (200..300).contains(&status);

            let error = if success {
                succeeded += 1;
                None
            } else {
                failed += 1;
                Some(StoreError::index(op["error"].to_string()))
            };

            items.push(BulkItemResult { id, success, error });
        }

        Ok(BulkSummary {
            total: items.len(),
            succeeded,
            failed,
            items,
        })
    }

    /// Convert a search response body into a [`SearchResponse`].
    fn parse_search_response(body: &Value) -> SearchResponse {
        let hits = body["hits"]["hits"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .map(|hit| SearchHit {
                        id: hit["_id"].as_str().unwrap_or_default().to_string(),
                        score: hit["_score"].as_f64(),
                        source: hit.get("_source").cloned(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Engines older than 7.x report total as a bare number.
        let total = body["hits"]["total"]["value"]
            .as_u64()
            .or_else(|| body["hits"]["total"].as_u64())
            .unwrap_or(0);

        SearchResponse::new(hits, total, body["took"].as_u64().unwrap_or(0))
    }

    /// Convert an mget response into per-ID optional bodies.
    fn parse_mget_response(body: &Value) -> Result<Vec<Option<Value>>, StoreError> {
        let docs = body["docs"]
            .as_array()
            .ok_or_else(|| StoreError::parse("missing docs in mget response"))?;

        Ok(docs
            .iter()
            .map(|doc| {
                if doc["found"].as_bool().unwrap_or(false) {
                    doc.get("_source").cloned()
                } else {
                    None
                }
            })
            .collect())
    }

    /// Check the `acknowledged` flag of an administrative response.
    fn check_acknowledged(context: &str, body: &Value) -> Result<(), StoreError> {
        if body["acknowledged"].as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(StoreError::index_creation(format!(
                "backend did not acknowledge {}",
                context
            )))
        }
    }
}

#[async_trait]
impl DocumentStore for OpenSearchProvider {
    async fn ensure_index(&self, index: &str, settings: Option<Value>) -> Result<(), StoreError> {
        if self.index_exists(index).await? {
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(settings.unwrap_or_else(|| json!({})))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Lost the creation race against another process; the index is
            // there, which is all this call promises.
            if body.contains("resource_already_exists_exception") {
                debug!(index = %index, "Index created concurrently elsewhere");
                return Ok(());
            }
            error!(status = %status, body = %body, index = %index, "Index creation failed");
            return Err(StoreError::index_creation(format!(
                "create index {} failed with status {}: {}",
                index, status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Self::check_acknowledged("index creation", &body)?;

        info!(index = %index, "Created index");
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }

    async fn delete_index(&self, index: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(format!("index {}", index)));
        }
        if !status.is_success() {
            let msg = Self::response_failure("Delete index", response).await;
            return Err(StoreError::delete(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Self::check_acknowledged("index deletion", &body)
            .map_err(|_| StoreError::delete(format!("backend did not acknowledge deleting {}", index)))
    }

    async fn exists(&self, index: &str, id: &str) -> Result<bool, StoreError> {
        let response = self
            .client
            .exists(ExistsParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }

    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        doc: &Value,
    ) -> Result<String, StoreError> {
        let response = match id {
            Some(id) => {
                self.client
                    .index(IndexParts::IndexId(index, id))
                    .body(doc)
                    .send()
                    .await
            }
            None => {
                self.client
                    .index(IndexParts::Index(index))
                    .body(doc)
                    .send()
                    .await
            }
        }
        .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if status == StatusCode::CONFLICT {
            let msg = Self::response_failure("Index", response).await;
            return Err(StoreError::conflict(msg));
        }
        if !status.is_success() {
            let msg = Self::response_failure("Index", response).await;
            return Err(StoreError::index(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        let assigned = body["_id"]
            .as_str()
            .ok_or_else(|| StoreError::parse("missing _id in index response"))?;

        debug!(index = %index, doc_id = %assigned, "Document indexed");
        Ok(assigned.to_string())
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Value, StoreError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(format!("{}/{}", index, id)));
        }
        if !status.is_success() {
            let msg = Self::response_failure("Get", response).await;
            return Err(StoreError::unknown(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        if !body["found"].as_bool().unwrap_or(false) {
            return Err(StoreError::not_found(format!("{}/{}", index, id)));
        }
        body.get("_source")
            .cloned()
            .ok_or_else(|| StoreError::parse("missing _source in get response"))
    }

    async fn get_documents(
        &self,
        index: &str,
        ids: &[String],
    ) -> Result<Vec<Option<Value>>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .mget(MgetParts::Index(index))
            .body(json!({ "ids": ids }))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let msg = Self::response_failure("Mget", response).await;
            return Err(StoreError::unknown(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Self::parse_mget_response(&body)
    }

    async fn update_document(&self, index: &str, id: &str, doc: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .update(UpdateParts::IndexId(index, id))
            .body(json!({ "doc": doc }))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(format!("{}/{}", index, id)));
        }
        if status == StatusCode::CONFLICT {
            let msg = Self::response_failure("Update", response).await;
            return Err(StoreError::conflict(msg));
        }
        if !status.is_success() {
            let msg = Self::response_failure("Update", response).await;
            return Err(StoreError::update(msg));
        }

        debug!(index = %index, doc_id = %id, "Document updated");
        Ok(())
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<bool, StoreError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        // 404 is not an error: the document simply was not there.
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            let msg = Self::response_failure("Delete", response).await;
            return Err(StoreError::delete(msg));
        }

        debug!(index = %index, doc_id = %id, "Document deleted");
        Ok(true)
    }

    async fn bulk_index(
        &self,
        index: &str,
        docs: &[BulkDocument],
    ) -> Result<BulkSummary, StoreError> {
        if docs.is_empty() {
            return Ok(BulkSummary::empty());
        }

        let body: Vec<JsonBody<Value>> = Self::bulk_index_lines(docs)
            .into_iter()
            .map(JsonBody::from)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let msg = Self::response_failure("Bulk", response).await;
            return Err(StoreError::bulk(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        let summary = Self::parse_bulk_summary(&body)?;

        debug!(
            index = %index,
            total = summary.total,
            failed = summary.failed,
            "Bulk index completed"
        );
        Ok(summary)
    }

    async fn bulk_execute(
        &self,
        index: &str,
        actions: &[BulkAction],
    ) -> Result<BulkSummary, StoreError> {
        if actions.is_empty() {
            return Ok(BulkSummary::empty());
        }

        let body: Vec<JsonBody<Value>> = Self::bulk_action_lines(actions)
            .into_iter()
            .map(JsonBody::from)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let msg = Self::response_failure("Bulk execute", response).await;
            return Err(StoreError::bulk(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        let summary = Self::parse_bulk_summary(&body)?;

        debug!(
            index = %index,
            total = summary.total,
            failed = summary.failed,
            "Bulk execute completed"
        );
        Ok(summary)
    }

    async fn search(&self, index: &str, query: &Value) -> Result<SearchResponse, StoreError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(query)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(format!("index {}", index)));
        }
        if !status.is_success() {
            let msg = Self::response_failure("Search", response).await;
            return Err(StoreError::search(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Ok(Self::parse_search_response(&body))
    }

    async fn aggregate(&self, index: &str, query: &Value) -> Result<Value, StoreError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(query)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let msg = Self::response_failure("Aggregate", response).await;
            return Err(StoreError::search(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Ok(body.get("aggregations").cloned().unwrap_or(Value::Null))
    }

    async fn put_template(&self, name: &str, body: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .put_template(IndicesPutTemplateParts::Name(name))
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let msg = Self::response_failure("Put template", response).await;
            return Err(StoreError::index_creation(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Self::check_acknowledged("template creation", &body)
    }

    async fn delete_template(&self, name: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .delete_template(IndicesDeleteTemplateParts::Name(name))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(format!("template {}", name)));
        }
        if !status.is_success() {
            let msg = Self::response_failure("Delete template", response).await;
            return Err(StoreError::delete(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Self::check_acknowledged("template deletion", &body)
            .map_err(|_| StoreError::delete(format!("backend did not acknowledge deleting template {}", name)))
    }

    async fn get_mapping(&self, index: &str) -> Result<Value, StoreError> {
        let response = self
            .client
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(format!("index {}", index)));
        }
        if !status.is_success() {
            let msg = Self::response_failure("Get mapping", response).await;
            return Err(StoreError::unknown(msg));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))
    }

    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[index]))
            .body(mapping)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let msg = Self::response_failure("Put mapping", response).await;
            return Err(StoreError::index_creation(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Self::check_acknowledged("mapping update", &body)
    }

    /// Advance the version counter of one document by re-indexing an empty
    /// body at its ID, returning the new `_version`.
    async fn increment(&self, index: &str, id: &str) -> Result<u64, StoreError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .body(json!({}))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let status = response.status_code();
        if status == StatusCode::CONFLICT {
            let msg = Self::response_failure("Increment", response).await;
            return Err(StoreError::conflict(msg));
        }
        if !status.is_success() {
            let msg = Self::response_failure("Increment", response).await;
            return Err(StoreError::index(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        body["_version"]
            .as_u64()
            .ok_or_else(|| StoreError::parse("missing _version in index response"))
    }

    /// `count` increments issued as one `_bulk` request repeating the same
    /// index action; each succeeded item carries one allocated version.
    async fn increment_batch(
        &self,
        index: &str,
        id: &str,
        count: u64,
    ) -> Result<Vec<u64>, StoreError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let body: Vec<JsonBody<Value>> = Self::bulk_increment_lines(id, count)
            .into_iter()
            .map(JsonBody::from)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let msg = Self::response_failure("Bulk increment", response).await;
            return Err(StoreError::bulk(msg));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Self::parse_bulk_versions(&body)
    }
}
