//! Error types for the document store client.
//!
//! This module provides a unified error type for all store operations.

mod store_error;

pub use store_error::StoreError;
