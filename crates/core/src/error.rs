//! Error types for the document model

use thiserror::Error;

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors that can occur while working with documents
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A serialized cell key did not have the `"row-col"` form
    #[error("Invalid cell key: {0}")]
    InvalidCellKey(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
