//! Request and response types for document store operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StoreError;

/// A document submitted to a bulk index operation.
///
/// When `id` is `None` the backend assigns one (or, with sequence mode
/// enabled on the owning service, the sequence does).
#[derive(Debug, Clone)]
pub struct BulkDocument {
    /// Explicit document identifier, if any.
    pub id: Option<String>,
    /// The document body.
    pub source: Value,
}

impl BulkDocument {
    /// Create a bulk document with an explicit identifier.
    pub fn with_id(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: Some(id.into()),
            source,
        }
    }

    /// Create a bulk document without an identifier.
    pub fn auto_id(source: Value) -> Self {
        Self { id: None, source }
    }
}

/// A single operation carried by a bulk request.
///
/// Produced by the buffered bulk session on `DocumentService`, which mixes
/// document creations and partial updates into one request.
#[derive(Debug, Clone)]
pub enum BulkAction {
    /// Create or replace a document.
    Index {
        /// Explicit document identifier; the backend assigns one when absent.
        id: Option<String>,
        /// The document body.
        source: Value,
    },
    /// Apply a partial update to an existing document.
    Update {
        /// The document identifier.
        id: String,
        /// The fields to change.
        doc: Value,
    },
}

/// Result of a bulk operation for a single document.
#[derive(Debug, Clone)]
pub struct BulkItemResult {
    /// The document identifier (backend-assigned when none was supplied).
    pub id: Option<String>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<StoreError>,
}

/// Summary of a bulk operation with aggregate statistics and per-item results.
///
/// Allows callers to handle partial failures gracefully: individual item
/// failures are reported here instead of failing the whole batch.
#[derive(Debug, Clone)]
pub struct BulkSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub items: Vec<BulkItemResult>,
}

impl BulkSummary {
    /// Create an empty summary (for empty batches).
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            items: Vec::new(),
        }
    }
}

/// A single search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// The document identifier.
    pub id: String,

    /// Relevance score from the search engine, if scoring applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// The stored document body. `None` when `_source` is disabled for the
    /// index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
}

/// Complete search response with hits and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// The matching documents, in engine order.
    pub hits: Vec<SearchHit>,

    /// Total number of matching documents.
    /// May be greater than the number of returned hits due to pagination.
    pub total: u64,

    /// Time taken to execute the search in milliseconds.
    pub took_ms: u64,
}

impl SearchResponse {
    /// Create an empty search response.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
            took_ms: 0,
        }
    }

    /// Create a new search response.
    pub fn new(hits: Vec<SearchHit>, total: u64, took_ms: u64) -> Self {
        Self {
            hits,
            total,
            took_ms,
        }
    }

    /// Returns true if there are no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the number of hits in this response.
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_response_empty() {
        let response = SearchResponse::empty();
        assert!(response.is_empty());
        assert_eq!(response.len(), 0);
        assert_eq!(response.total, 0);
    }

    #[test]
    fn test_search_response_new() {
        let hits = vec![SearchHit {
            id: "42".to_string(),
            score: Some(1.5),
            source: Some(json!({"field": "value"})),
        }];

        let response = SearchResponse::new(hits, 100, 5);
        assert!(!response.is_empty());
        assert_eq!(response.len(), 1);
        assert_eq!(response.total, 100);
        assert_eq!(response.took_ms, 5);
    }

    #[test]
    fn test_search_response_serialization() {
        let response = SearchResponse::new(
            vec![SearchHit {
                id: "7".to_string(),
                score: None,
                source: Some(json!({"name": "test"})),
            }],
            1,
            10,
        );

        let json = serde_json::to_string(&response).unwrap();
        let deserialized: SearchResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(response, deserialized);
    }

    #[test]
    fn test_bulk_summary_empty() {
        let summary = BulkSummary::empty();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 0);
        assert!(summary.items.is_empty());
    }

    #[test]
    fn test_bulk_document_constructors() {
        let with_id = BulkDocument::with_id("5", json!({}));
        assert_eq!(with_id.id.as_deref(), Some("5"));

        let auto = BulkDocument::auto_id(json!({}));
        assert!(auto.id.is_none());
    }
}
