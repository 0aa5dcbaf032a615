//! # Search Store
//!
//! This crate provides traits and implementations for interacting with a
//! document search store. It includes definitions for errors, interfaces, a
//! concrete implementation for OpenSearch, and auto-increment ID sequences
//! built on the store's atomic document version counter.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod sequence;
pub mod service;
pub mod types;

pub use config::DocumentServiceConfig;
pub use errors::StoreError;
pub use interfaces::DocumentStore;
pub use opensearch::{OpenSearchProvider, SEQUENCE_INDEX};
pub use sequence::Sequence;
pub use service::DocumentService;
pub use types::{BulkAction, BulkDocument, BulkItemResult, BulkSummary, SearchHit, SearchResponse};
