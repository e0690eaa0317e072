//! Error types for storyloom.

use thiserror::Error;

/// Result type alias using storyloom's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for storyloom operations.
///
/// The store and service surfaces absorb these into empty-result/boolean
/// returns; the `Result` signatures exist at the capability seams so the
/// never-propagate contract is visible in the types.
#[derive(Error, Debug)]
pub enum Error {
    /// Named collection is not part of the fixed collection set
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// Vector index operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Search operation failed
    #[error("Search error: {0}")]
    Search(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input rejected at the service boundary
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
