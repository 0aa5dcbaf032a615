//! Document store error types.
//!
//! This module defines the unified error type for all document store
//! operations, including both low-level backend errors (connection,
//! serialization, etc.) and high-level application errors (validation,
//! sequence timeouts, etc.).

use thiserror::Error;

/// Unified errors from document store operations.
///
/// Used by the `DocumentStore` trait, `DocumentService`, and `Sequence` for
/// all operations against the backing search engine.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Validation error (e.g., missing required fields, empty IDs).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the document store backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Document or index not found where one was required.
    ///
    /// A missing sequence counter document is *not* reported through this
    /// variant; the bootstrap path treats that as an expected condition.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Version conflict reported by the backend.
    ///
    /// Not expected for sequence increments (the backend's version counter
    /// is atomic); surfaced separately so callers can tell it apart from
    /// transport failures.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Failed to index a document.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Bulk operation failed as a whole.
    #[error("Bulk error: {0}")]
    BulkError(String),

    /// Failed to update a document.
    #[error("Update error: {0}")]
    UpdateError(String),

    /// Failed to delete a document.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Search request failed.
    #[error("Search error: {0}")]
    SearchError(String),

    /// Failed to create an index or template.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to parse a response from the backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// A deadline elapsed before the operation could complete.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Unknown error.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl StoreError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create a bulk error.
    pub fn bulk(msg: impl Into<String>) -> Self {
        Self::BulkError(msg.into())
    }

    /// Create an update error.
    pub fn update(msg: impl Into<String>) -> Self {
        Self::UpdateError(msg.into())
    }

    /// Create a delete error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    /// Create a search error.
    pub fn search(msg: impl Into<String>) -> Self {
        Self::SearchError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an unknown error.
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }
}
