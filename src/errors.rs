//! Error types for DocuMind
//!
//! Infrastructure failures are errors. Expected degradations of the answering
//! pipeline (empty retrieval, generation failure, judge rejection) are values
//! on `QueryResult` instead.

use thiserror::Error;

/// Main error type for the DocuMind query system
#[derive(Error, Debug)]
pub enum DocuMindError {
    /// Embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store errors
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Configured collection not present in the vector store
    #[error("Collection '{collection}' not found. Index the corpus first.")]
    CollectionMissing { collection: String },

    /// Ollama API errors
    #[error("Ollama API error: {0}")]
    OllamaApiError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for DocuMind operations
pub type Result<T> = std::result::Result<T, DocuMindError>;

/// Convert anyhow errors to DocuMindError
impl From<anyhow::Error> for DocuMindError {
    fn from(err: anyhow::Error) -> Self {
        DocuMindError::Generic(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = DocuMindError::Timeout { duration_ms: 15000 };
        assert_eq!(err.to_string(), "Operation timed out after 15000ms");
    }

    #[test]
    fn test_collection_missing_display() {
        let err = DocuMindError::CollectionMissing {
            collection: "aws-org-docs".to_string(),
        };
        assert!(err.to_string().contains("aws-org-docs"));
    }

    #[test]
    fn test_from_anyhow_keeps_context_chain() {
        let err: DocuMindError = anyhow::anyhow!("connection refused")
            .context("Failed to search points")
            .into();
        let msg = err.to_string();
        assert!(msg.contains("Failed to search points"));
        assert!(msg.contains("connection refused"));
    }
}
