//! Error types for the QA pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// QA pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document could not be read or parsed
    #[error("Failed to read document '{filename}': {message}")]
    DocumentRead { filename: String, message: String },

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// No index artifact at the given path
    #[error("No index found at {0}")]
    IndexNotFound(PathBuf),

    /// Index artifact exists but is unreadable or inconsistent
    #[error("Index is corrupt: {0}")]
    IndexCorrupt(String),

    /// Language model service unreachable or failing
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// No index bound yet; valid state, handled as guidance
    #[error("No documents indexed yet")]
    EmptyIndex,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a document read error
    pub fn document_read(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentRead {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an index corruption error
    pub fn index_corrupt(message: impl Into<String>) -> Self {
        Self::IndexCorrupt(message.into())
    }

    /// Create a model unavailability error
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::ModelUnavailable(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
