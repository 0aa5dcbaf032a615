//! OpenSearch implementation of the document store.
//!
//! This module provides a concrete implementation of `DocumentStore` using
//! OpenSearch as the backend, plus the configuration of the administrative
//! sequence index.

mod index_config;
mod provider;

pub use index_config::{
    max_id_scan_query, sequence_index_settings, BOOTSTRAP_SCAN_SIZE, SEQUENCE_INDEX,
};
pub use provider::OpenSearchProvider;
