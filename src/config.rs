//! Configuration types for the DocumentService.

/// Configuration for the DocumentService.
///
/// This struct allows customization of service behavior, particularly around
/// bulk operation limits. Use this to control resource usage and prevent
/// accidentally sending overly large batches to the document store backend.
#[derive(Debug, Clone)]
pub struct DocumentServiceConfig {
    /// Maximum number of documents allowed in a single bulk operation.
    ///
    /// Set to `None` to disable the limit (not recommended for production).
    /// Defaults to 1000 if not specified.
    pub max_batch_size: Option<usize>,
}

impl Default for DocumentServiceConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
        }
    }
}

impl DocumentServiceConfig {
    /// Create a config with no batch size limit.
    ///
    /// # Warning
    ///
    /// Use with caution. Removing batch size limits can lead to memory
    /// issues and timeouts when processing very large batches. Not
    /// recommended for production.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }

    /// Create a config with a custom batch size limit.
    ///
    /// # Arguments
    ///
    /// * `max_batch_size` - Maximum number of documents allowed in a single bulk operation
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
        }
    }
}
