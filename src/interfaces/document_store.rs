//! Document store trait definition.
//!
//! This module defines the abstract interface for document store operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch,
//! in-memory test stores, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::StoreError;
use crate::types::{BulkAction, BulkDocument, BulkSummary, SearchResponse};

/// Abstracts the underlying document store (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into `DocumentService` and `Sequence` as
/// `Arc<dyn DocumentStore>` to enable dependency injection and isolated
/// testing with mock implementations. There is no process-wide shared client;
/// every consumer owns a handle to the store it was constructed with.
///
/// All methods return `Result<T, StoreError>` for consistent error handling
/// across backend implementations.
///
/// # Counter primitives
///
/// `increment` and `increment_batch` are the atomic allocation primitives
/// used by [`Sequence`](crate::sequence::Sequence). They advance the version
/// number of a single document; atomicity is delegated entirely to the
/// backend's native optimistic-concurrency counter, and no client-side
/// locking is attempted.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ensure an index exists, creating it with the given settings if needed.
    ///
    /// Idempotent: a no-op when the index already exists.
    async fn ensure_index(&self, index: &str, settings: Option<Value>) -> Result<(), StoreError>;

    /// Check whether an index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError>;

    /// Delete an index.
    async fn delete_index(&self, index: &str) -> Result<(), StoreError>;

    /// Check whether a document exists.
    async fn exists(&self, index: &str, id: &str) -> Result<bool, StoreError>;

    /// Create a document, returning its identifier.
    ///
    /// When `id` is `None` the backend assigns one.
    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        doc: &Value,
    ) -> Result<String, StoreError>;

    /// Retrieve a document body by identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The stored `_source` body
    /// * `Err(StoreError::NotFound)` - If the document does not exist
    async fn get_document(&self, index: &str, id: &str) -> Result<Value, StoreError>;

    /// Retrieve multiple document bodies by identifier.
    ///
    /// The result has the same length and order as `ids`; missing documents
    /// are `None`.
    async fn get_documents(
        &self,
        index: &str,
        ids: &[String],
    ) -> Result<Vec<Option<Value>>, StoreError>;

    /// Apply a partial update to an existing document.
    async fn update_document(&self, index: &str, id: &str, doc: &Value) -> Result<(), StoreError>;

    /// Delete a document by identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The document existed and was deleted
    /// * `Ok(false)` - The document did not exist
    async fn delete_document(&self, index: &str, id: &str) -> Result<bool, StoreError>;

    /// Index multiple documents in one bulk request.
    ///
    /// Individual item failures are reported in the summary rather than
    /// failing the whole batch.
    async fn bulk_index(
        &self,
        index: &str,
        docs: &[BulkDocument],
    ) -> Result<BulkSummary, StoreError>;

    /// Execute a mixed batch of index and update actions in one bulk
    /// request.
    ///
    /// Backs the buffered bulk session: flushes carry creations and partial
    /// updates together. Individual item failures are reported in the
    /// summary rather than failing the whole batch.
    async fn bulk_execute(
        &self,
        index: &str,
        actions: &[BulkAction],
    ) -> Result<BulkSummary, StoreError>;

    /// Execute a search query against an index.
    async fn search(&self, index: &str, query: &Value) -> Result<SearchResponse, StoreError>;

    /// Execute an aggregation query, returning the aggregation results.
    async fn aggregate(&self, index: &str, query: &Value) -> Result<Value, StoreError>;

    /// Create or replace an index template.
    async fn put_template(&self, name: &str, body: &Value) -> Result<(), StoreError>;

    /// Delete an index template.
    async fn delete_template(&self, name: &str) -> Result<(), StoreError>;

    /// Retrieve the mapping of an index.
    async fn get_mapping(&self, index: &str) -> Result<Value, StoreError>;

    /// Set the mapping of an index.
    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), StoreError>;

    /// Atomically advance the version counter of one document by one,
    /// returning the new version number.
    async fn increment(&self, index: &str, id: &str) -> Result<u64, StoreError>;

    /// Atomically advance the version counter of one document `count` times.
    ///
    /// Equivalent to `count` calls to [`increment`](Self::increment); issued
    /// as a batch purely for efficiency. The returned version numbers are
    /// individually unique and valid but carry no ordering guarantee.
    ///
    /// # Failure
    ///
    /// Any transport or backend error fails the whole call: none of the
    /// requested increments are credited to the caller, even though the
    /// underlying counter may already have advanced. Lost increments are
    /// never reissued to another caller.
    async fn increment_batch(
        &self,
        index: &str,
        id: &str,
        count: u64,
    ) -> Result<Vec<u64>, StoreError>;
}
