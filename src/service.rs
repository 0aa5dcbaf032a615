//! Document service implementation.
//!
//! This module provides the main per-collection service for working with the
//! document store. Application code uses this to index, retrieve, update,
//! delete and search documents, and to manage the collection itself.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::DocumentServiceConfig;
use crate::errors::StoreError;
use crate::interfaces::DocumentStore;
use crate::sequence::Sequence;
use crate::types::{BulkAction, BulkDocument, BulkSummary, SearchResponse};

/// Operations buffered by an active bulk session, flushed as one request
/// when `threshold` is reached.
struct BulkBuffer {
    actions: Vec<BulkAction>,
    threshold: usize,
}

/// The main service for working with one collection of documents.
///
/// This is the high-level API that application code should use. It provides
/// input validation and ID assignment, and delegates to a [`DocumentStore`]
/// for actual backend operations. All operations return [`StoreError`] for
/// consistent error handling.
///
/// # ID assignment
///
/// By default documents indexed without an explicit ID get a backend-assigned
/// identifier. After [`set_sequence_mode`](Self::set_sequence_mode) the
/// service instead draws auto-increment integer IDs from a [`Sequence`] named
/// after the collection, so documents across all processes sharing the store
/// get gapless-ish, collision-free numeric identifiers.
///
/// # Bulk sessions
///
/// [`start_bulk`](Self::start_bulk) switches `index` and `update` into a
/// buffering mode: operations accumulate and are sent together whenever the
/// buffer reaches the session threshold, with a final flush at
/// [`stop_bulk`](Self::stop_bulk). Useful for ingest loops that would
/// otherwise pay one round trip per document.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use search_store::{DocumentService, OpenSearchProvider};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(OpenSearchProvider::new("http://localhost:9200").await?);
/// let mut service = DocumentService::new(store, "events");
/// service.ensure_collection(None).await?;
/// service.set_sequence_mode(100).await?;
///
/// // No ID supplied: the next sequence ID is drawn and used.
/// let id = service.index(&json!({"type": "deposit"}), None).await?;
/// # Ok(())
/// # }
/// ```
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    collection: String,
    config: DocumentServiceConfig,
    sequence: Option<Arc<Sequence>>,
    bulk: Mutex<Option<BulkBuffer>>,
}

impl DocumentService {
    /// Create a new DocumentService for `collection` with default
    /// configuration.
    ///
    /// The default configuration includes a batch size limit of 1000
    /// documents. Sequence mode is off until
    /// [`set_sequence_mode`](Self::set_sequence_mode) is called.
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            config: DocumentServiceConfig::default(),
            sequence: None,
            bulk: Mutex::new(None),
        }
    }

    /// Create a new DocumentService with custom configuration.
    pub fn with_config(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        config: DocumentServiceConfig,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            config,
            sequence: None,
            bulk: Mutex::new(None),
        }
    }

    /// The collection this service operates on.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), StoreError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(StoreError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Enable auto-increment ID assignment for this collection.
    ///
    /// Constructs a [`Sequence`] named after the collection, bootstrapping
    /// its counter relative to identifiers already present (see
    /// [`Sequence::new`]). Once enabled, [`index`](Self::index) calls
    /// without an explicit ID draw from the sequence, and
    /// [`next_id`](Self::next_id) exposes the sequence directly.
    ///
    /// # Arguments
    ///
    /// * `cache_size` - How many IDs each refill pre-fetches
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Sequence mode is active
    /// * `Err(StoreError)` - Bootstrap failed; the service stays in
    ///   backend-assigned ID mode
    pub async fn set_sequence_mode(&mut self, cache_size: usize) -> Result<(), StoreError> {
        let sequence = Sequence::new(
            Arc::clone(&self.store),
            self.collection.clone(),
            self.collection.clone(),
            cache_size,
        )
        .await?;
        self.sequence = Some(Arc::new(sequence));
        Ok(())
    }

    /// Draw the next auto-increment ID without indexing anything.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The allocated ID
    /// * `Err(StoreError::ValidationError)` - If sequence mode is not enabled
    pub async fn next_id(&self) -> Result<String, StoreError> {
        match &self.sequence {
            Some(sequence) => sequence.get_id().await,
            None => Err(StoreError::validation(
                "sequence mode is not enabled for this collection",
            )),
        }
    }

    /// Ensure the collection exists, creating it with the given settings if
    /// needed. Idempotent.
    pub async fn ensure_collection(&self, settings: Option<Value>) -> Result<(), StoreError> {
        self.store.ensure_index(&self.collection, settings).await
    }

    /// Check whether the collection exists.
    pub async fn collection_exists(&self) -> Result<bool, StoreError> {
        self.store.index_exists(&self.collection).await
    }

    /// Delete the collection and everything in it.
    pub async fn delete_collection(&self) -> Result<(), StoreError> {
        self.store.delete_index(&self.collection).await
    }

    /// Start a buffered bulk session.
    ///
    /// While a session is active, [`index`](Self::index) and
    /// [`update`](Self::update) buffer their operations instead of sending
    /// them. The buffer is flushed as one bulk request whenever it reaches
    /// `threshold` actions (minimum 1), and a final time at
    /// [`stop_bulk`](Self::stop_bulk). Per-item results of threshold
    /// flushes are discarded; only transport failures surface through the
    /// call that triggered the flush.
    ///
    /// # Returns
    ///
    /// * `Err(StoreError::ValidationError)` - If a session is already active
    pub async fn start_bulk(&self, threshold: usize) -> Result<(), StoreError> {
        let mut bulk = self.bulk.lock().await;
        if bulk.is_some() {
            return Err(StoreError::validation("a bulk session is already active"));
        }
        *bulk = Some(BulkBuffer {
            actions: Vec::new(),
            threshold: threshold.max(1),
        });
        Ok(())
    }

    /// Flush the remaining buffered operations and end the bulk session.
    ///
    /// Returns the summary of the final flush. Operations already sent by a
    /// threshold flush are not re-reported; an empty summary means nothing
    /// was left to send.
    ///
    /// # Returns
    ///
    /// * `Err(StoreError::ValidationError)` - If no session is active
    pub async fn stop_bulk(&self) -> Result<BulkSummary, StoreError> {
        let mut bulk = self.bulk.lock().await;
        let buffer = bulk
            .take()
            .ok_or_else(|| StoreError::validation("no bulk session is active"))?;
        if buffer.actions.is_empty() {
            return Ok(BulkSummary::empty());
        }
        self.store
            .bulk_execute(&self.collection, &buffer.actions)
            .await
    }

    /// Send the buffer as one bulk request once it has reached its
    /// threshold. Item results are discarded.
    async fn flush_at_threshold(&self, buffer: &mut BulkBuffer) -> Result<(), StoreError> {
        if buffer.actions.len() >= buffer.threshold {
            let actions = std::mem::take(&mut buffer.actions);
            self.store.bulk_execute(&self.collection, &actions).await?;
        }
        Ok(())
    }

    /// Index a document, returning the identifier it was stored under.
    ///
    /// With an explicit `id` the document is created or replaced at that
    /// identifier. Without one, sequence mode draws the next auto-increment
    /// ID; otherwise the backend assigns an identifier.
    ///
    /// During a bulk session the operation is buffered instead of sent. The
    /// returned identifier is the one that will be used, or an empty string
    /// when the backend assigns it at flush time.
    pub async fn index(&self, doc: &Value, id: Option<&str>) -> Result<String, StoreError> {
        let id = match (id, &self.sequence) {
            (Some(id), _) => Some(id.to_string()),
            (None, Some(sequence)) => Some(sequence.get_id().await?),
            (None, None) => None,
        };

        let mut bulk = self.bulk.lock().await;
        if let Some(buffer) = bulk.as_mut() {
            buffer.actions.push(BulkAction::Index {
                id: id.clone(),
                source: doc.clone(),
            });
            self.flush_at_threshold(buffer).await?;
            return Ok(id.unwrap_or_default());
        }
        drop(bulk);

        match id {
            Some(id) => {
                self.store
                    .index_document(&self.collection, Some(&id), doc)
                    .await
            }
            None => self.store.index_document(&self.collection, None, doc).await,
        }
    }

    /// Check whether a document exists.
    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        self.store.exists(&self.collection, id).await
    }

    /// Retrieve a document body by identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The stored document body
    /// * `Err(StoreError::NotFound)` - If the document does not exist
    pub async fn get(&self, id: &str) -> Result<Value, StoreError> {
        if id.is_empty() {
            return Err(StoreError::validation("document id is required"));
        }
        self.store.get_document(&self.collection, id).await
    }

    /// Retrieve multiple document bodies by identifier.
    ///
    /// The result has the same length and order as `ids`; missing documents
    /// are `None`. An empty `ids` slice short-circuits to an empty result.
    pub async fn get_multi(&self, ids: &[String]) -> Result<Vec<Option<Value>>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.validate_batch_size(ids.len())?;
        self.store.get_documents(&self.collection, ids).await
    }

    /// Apply a partial update to an existing document.
    ///
    /// Only the fields present in `doc` are changed. The document must
    /// already exist; updating a missing document returns
    /// `StoreError::NotFound`.
    ///
    /// During a bulk session the operation is buffered instead of sent.
    pub async fn update(&self, id: &str, doc: &Value) -> Result<(), StoreError> {
        if id.is_empty() {
            return Err(StoreError::validation("update needs a document id"));
        }

        let mut bulk = self.bulk.lock().await;
        if let Some(buffer) = bulk.as_mut() {
            buffer.actions.push(BulkAction::Update {
                id: id.to_string(),
                doc: doc.clone(),
            });
            return self.flush_at_threshold(buffer).await;
        }
        drop(bulk);

        self.store.update_document(&self.collection, id, doc).await
    }

    /// Delete a document by identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The document existed and was deleted
    /// * `Ok(false)` - The document did not exist
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        if id.is_empty() {
            return Err(StoreError::validation("delete needs a document id"));
        }
        self.store.delete_document(&self.collection, id).await
    }

    /// Index multiple documents in one bulk request and return a summary of
    /// successful and failed operations.
    ///
    /// Documents without an ID get backend-assigned identifiers; sequence
    /// mode does not apply to bulk indexing. Individual item failures are
    /// reported in the summary rather than failing the whole batch.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkSummary)` - Total, succeeded and failed counts plus
    ///   per-item results
    /// * `Err(StoreError::BatchSizeExceeded)` - If the batch exceeds the
    ///   configured maximum
    /// * `Err(StoreError)` - If the bulk request fails entirely
    pub async fn bulk_index(&self, docs: Vec<BulkDocument>) -> Result<BulkSummary, StoreError> {
        if docs.is_empty() {
            return Ok(BulkSummary::empty());
        }
        self.validate_batch_size(docs.len())?;
        self.store.bulk_index(&self.collection, &docs).await
    }

    /// Execute a search query against the collection.
    pub async fn search(&self, query: &Value) -> Result<SearchResponse, StoreError> {
        self.store.search(&self.collection, query).await
    }

    /// Execute an aggregation query, returning the aggregation results.
    pub async fn aggregate(&self, query: &Value) -> Result<Value, StoreError> {
        self.store.aggregate(&self.collection, query).await
    }

    /// Create or replace an index template.
    pub async fn put_template(&self, name: &str, body: &Value) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::validation("template name is required"));
        }
        self.store.put_template(name, body).await
    }

    /// Delete an index template.
    pub async fn delete_template(&self, name: &str) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::validation("template name is required"));
        }
        self.store.delete_template(name).await
    }

    /// Retrieve the mapping of the collection.
    pub async fn get_mapping(&self) -> Result<Value, StoreError> {
        self.store.get_mapping(&self.collection).await
    }

    /// Set the mapping of the collection.
    pub async fn put_mapping(&self, mapping: &Value) -> Result<(), StoreError> {
        self.store.put_mapping(&self.collection, mapping).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Mutex;

    use crate::types::{BulkItemResult, SearchHit};

    /// Mock store recording the calls the service makes.
    struct MockStore {
        indexed: Mutex<Vec<(Option<String>, Value)>>,
        updated: Mutex<Vec<(String, Value)>>,
        /// One entry per bulk_execute call, holding that flush's actions.
        executed: Mutex<Vec<Vec<BulkAction>>>,
        counters: StdMutex<HashMap<String, u64>>,
        scan_hits: Vec<SearchHit>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                indexed: Mutex::new(Vec::new()),
                updated: Mutex::new(Vec::new()),
                executed: Mutex::new(Vec::new()),
                counters: StdMutex::new(HashMap::new()),
                scan_hits: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for MockStore {
        async fn ensure_index(
            &self,
            _index: &str,
            _settings: Option<Value>,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn index_exists(&self, _index: &str) -> Result<bool, StoreError> {
            Ok(true)
        }

        async fn delete_index(&self, _index: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn exists(&self, index: &str, id: &str) -> Result<bool, StoreError> {
            Ok(self
                .counters
                .lock()
                .unwrap()
                .contains_key(&format!("{}/{}", index, id)))
        }

        async fn index_document(
            &self,
            _index: &str,
            id: Option<&str>,
            doc: &Value,
        ) -> Result<String, StoreError> {
            self.indexed
                .lock()
                .await
                .push((id.map(str::to_string), doc.clone()));
            Ok(id.unwrap_or("backend-assigned").to_string())
        }

        async fn get_document(&self, _index: &str, id: &str) -> Result<Value, StoreError> {
            if id == "missing" {
                return Err(StoreError::not_found(format!("document {} not found", id)));
            }
            Ok(json!({"id": id}))
        }

        async fn get_documents(
            &self,
            _index: &str,
            ids: &[String],
        ) -> Result<Vec<Option<Value>>, StoreError> {
            Ok(ids
                .iter()
                .map(|id| (id != "missing").then(|| json!({"id": id})))
                .collect())
        }

        async fn update_document(
            &self,
            _index: &str,
            id: &str,
            doc: &Value,
        ) -> Result<(), StoreError> {
            self.updated.lock().await.push((id.to_string(), doc.clone()));
            Ok(())
        }

        async fn delete_document(&self, _index: &str, id: &str) -> Result<bool, StoreError> {
            Ok(id != "missing")
        }

        async fn bulk_index(
            &self,
            _index: &str,
            docs: &[BulkDocument],
        ) -> Result<BulkSummary, StoreError> {
            let items: Vec<BulkItemResult> = docs
                .iter()
                .map(|doc| BulkItemResult {
                    id: doc.id.clone().or_else(|| Some("backend-assigned".into())),
                    success: true,
                    error: None,
                })
                .collect();
            Ok(BulkSummary {
                total: docs.len(),
                succeeded: docs.len(),
                failed: 0,
                items,
            })
        }

        async fn bulk_execute(
            &self,
            _index: &str,
            actions: &[BulkAction],
        ) -> Result<BulkSummary, StoreError> {
            self.executed.lock().await.push(actions.to_vec());
            Ok(BulkSummary {
                total: actions.len(),
                succeeded: actions.len(),
                failed: 0,
                items: Vec::new(),
            })
        }

        async fn search(&self, _index: &str, _query: &Value) -> Result<SearchResponse, StoreError> {
            Ok(SearchResponse::new(
                self.scan_hits.clone(),
                self.scan_hits.len() as u64,
                1,
            ))
        }

        async fn aggregate(&self, _index: &str, _query: &Value) -> Result<Value, StoreError> {
            Ok(json!({}))
        }

        async fn put_template(&self, _name: &str, _body: &Value) -> Result<(), StoreError> {
            Ok(())
        }

        async fn delete_template(&self, _name: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn get_mapping(&self, _index: &str) -> Result<Value, StoreError> {
            Ok(json!({}))
        }

        async fn put_mapping(&self, _index: &str, _mapping: &Value) -> Result<(), StoreError> {
            Ok(())
        }

        async fn increment(&self, index: &str, id: &str) -> Result<u64, StoreError> {
            let versions = self.increment_batch(index, id, 1).await?;
            Ok(versions[0])
        }

        async fn increment_batch(
            &self,
            index: &str,
            id: &str,
            count: u64,
        ) -> Result<Vec<u64>, StoreError> {
            let mut counters = self.counters.lock().unwrap();
            let counter = counters.entry(format!("{}/{}", index, id)).or_insert(0);
            Ok((0..count)
                .map(|_| {
                    *counter += 1;
                    *counter
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_index_with_explicit_id() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(Arc::clone(&store) as Arc<dyn DocumentStore>, "events");

        let id = service.index(&json!({"a": 1}), Some("42")).await.unwrap();

        assert_eq!(id, "42");
        let indexed = store.indexed.lock().await;
        assert_eq!(indexed.len(), 1);
        assert_eq!(indexed[0].0.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_index_without_id_uses_backend_assignment() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(Arc::clone(&store) as Arc<dyn DocumentStore>, "events");

        let id = service.index(&json!({"a": 1}), None).await.unwrap();

        assert_eq!(id, "backend-assigned");
    }

    #[tokio::test]
    async fn test_index_draws_sequence_id_when_enabled() {
        let store = Arc::new(MockStore::new());
        let mut service =
            DocumentService::new(Arc::clone(&store) as Arc<dyn DocumentStore>, "events");
        service.set_sequence_mode(1).await.unwrap();

        let id = service.index(&json!({"a": 1}), None).await.unwrap();

        assert_eq!(id, "1");
        let indexed = store.indexed.lock().await;
        assert_eq!(indexed[0].0.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_explicit_id_bypasses_sequence() {
        let store = Arc::new(MockStore::new());
        let mut service =
            DocumentService::new(Arc::clone(&store) as Arc<dyn DocumentStore>, "events");
        service.set_sequence_mode(1).await.unwrap();

        let id = service.index(&json!({"a": 1}), Some("custom")).await.unwrap();

        assert_eq!(id, "custom");
    }

    #[tokio::test]
    async fn test_next_id_without_sequence_mode() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(store, "events");

        let result = service.next_id().await;

        assert!(matches!(result, Err(StoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(store, "events");

        let result = service.update("", &json!({"a": 1})).await;

        assert!(matches!(result, Err(StoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(store, "events");

        assert!(matches!(
            service.delete("").await,
            Err(StoreError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_bulk_index_empty() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(store, "events");

        let summary = service.bulk_index(vec![]).await.unwrap();

        assert_eq!(summary.total, 0);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 0);
        assert!(summary.items.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_index_batch_size_exceeded() {
        let store = Arc::new(MockStore::new());
        let config = DocumentServiceConfig::with_max_batch_size(2);
        let service = DocumentService::with_config(store, "events", config);

        let docs = vec![
            BulkDocument::auto_id(json!({"n": 1})),
            BulkDocument::auto_id(json!({"n": 2})),
            BulkDocument::auto_id(json!({"n": 3})),
        ];
        let result = service.bulk_index(docs).await;

        assert!(matches!(
            result,
            Err(StoreError::BatchSizeExceeded {
                provided: 3,
                max: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_bulk_index_unlimited_config() {
        let store = Arc::new(MockStore::new());
        let config = DocumentServiceConfig::unlimited();
        let service = DocumentService::with_config(store, "events", config);

        let docs: Vec<BulkDocument> = (0..5000)
            .map(|i| BulkDocument::auto_id(json!({"n": i})))
            .collect();

        let summary = service.bulk_index(docs).await.unwrap();
        assert_eq!(summary.total, 5000);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_bulk_session_buffers_until_threshold() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(Arc::clone(&store) as Arc<dyn DocumentStore>, "events");
        service.start_bulk(3).await.unwrap();

        service.index(&json!({"n": 1}), Some("1")).await.unwrap();
        service.update("1", &json!({"n": 2})).await.unwrap();
        assert!(store.executed.lock().await.is_empty());

        // Third action reaches the threshold and triggers one flush.
        service.index(&json!({"n": 3}), Some("3")).await.unwrap();
        let executed = store.executed.lock().await;
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].len(), 3);
        assert!(matches!(
            executed[0][1],
            BulkAction::Update { ref id, .. } if id == "1"
        ));

        // Nothing went through the one-shot paths.
        assert!(store.indexed.lock().await.is_empty());
        assert!(store.updated.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_stop_bulk_flushes_remainder() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(Arc::clone(&store) as Arc<dyn DocumentStore>, "events");
        service.start_bulk(10).await.unwrap();

        service.index(&json!({"n": 1}), Some("1")).await.unwrap();
        service.index(&json!({"n": 2}), Some("2")).await.unwrap();

        let summary = service.stop_bulk().await.unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(store.executed.lock().await.len(), 1);

        // The session is over: indexing goes straight through again.
        service.index(&json!({"n": 3}), Some("3")).await.unwrap();
        assert_eq!(store.indexed.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_session_draws_sequence_ids() {
        let store = Arc::new(MockStore::new());
        let mut service =
            DocumentService::new(Arc::clone(&store) as Arc<dyn DocumentStore>, "events");
        service.set_sequence_mode(1).await.unwrap();
        service.start_bulk(10).await.unwrap();

        let id = service.index(&json!({"n": 1}), None).await.unwrap();
        assert_eq!(id, "1");

        service.stop_bulk().await.unwrap();
        let executed = store.executed.lock().await;
        assert!(matches!(
            executed[0][0],
            BulkAction::Index { id: Some(ref id), .. } if id == "1"
        ));
    }

    #[tokio::test]
    async fn test_bulk_session_backend_assigned_id_is_empty() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(store, "events");
        service.start_bulk(10).await.unwrap();

        // Without sequence mode or an explicit ID, the identifier is only
        // assigned when the flush lands.
        let id = service.index(&json!({"n": 1}), None).await.unwrap();
        assert_eq!(id, "");
    }

    #[tokio::test]
    async fn test_bulk_session_lifecycle_validation() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(store, "events");

        assert!(matches!(
            service.stop_bulk().await,
            Err(StoreError::ValidationError(_))
        ));

        service.start_bulk(5).await.unwrap();
        assert!(matches!(
            service.start_bulk(5).await,
            Err(StoreError::ValidationError(_))
        ));

        // An untouched session flushes nothing.
        let summary = service.stop_bulk().await.unwrap();
        assert_eq!(summary.total, 0);
    }

    #[tokio::test]
    async fn test_get_multi_empty_short_circuits() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(store, "events");

        let docs = service.get_multi(&[]).await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_get_multi_preserves_order_and_misses() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(store, "events");

        let ids = vec!["1".to_string(), "missing".to_string(), "2".to_string()];
        let docs = service.get_multi(&ids).await.unwrap();

        assert_eq!(docs.len(), 3);
        assert!(docs[0].is_some());
        assert!(docs[1].is_none());
        assert!(docs[2].is_some());
    }

    #[tokio::test]
    async fn test_template_name_required() {
        let store = Arc::new(MockStore::new());
        let service = DocumentService::new(store, "events");

        assert!(matches!(
            service.put_template("", &json!({})).await,
            Err(StoreError::ValidationError(_))
        ));
        assert!(matches!(
            service.delete_template("").await,
            Err(StoreError::ValidationError(_))
        ));
    }
}
