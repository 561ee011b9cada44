//! Error types for the academic tutor assistant

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the tutor system
#[derive(Error, Debug)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Query engine error: {0}")]
    QueryEngine(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Ingestion error: {0}")]
    Ingest(String),

    #[error("Quiz error: {0}")]
    Quiz(String),

    #[error("Video search error: {0}")]
    VideoSearch(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::QueryEngine(err.to_string())
    }
}
