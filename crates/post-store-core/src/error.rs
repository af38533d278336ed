//! Error types for the post store core library.

use thiserror::Error;

use crate::post::BackendKind;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the post store library.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No post with the requested id in the targeted backend
    #[error("Post not found in {backend} with id {id}")]
    NotFound { backend: BackendKind, id: String },

    /// Caller is not the owner of the post it tried to mutate
    #[error("Access denied to modify post {0}")]
    AccessDenied(String),

    /// Empty text or missing image handed to the coordinator
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upload, replace or delete against the blob store failed
    #[error("Blob store error: {0}")]
    BlobStore(String),

    /// Storage backend error
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// One of the concurrent scans in the user aggregation failed
    #[error("Aggregation failed on {backend}: {source}")]
    Aggregate {
        backend: BackendKind,
        #[source]
        source: Box<Error>,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Backend-specific errors
#[derive(Error, Debug)]
pub enum BackendError {
    /// PostgreSQL driver error
    #[error("Postgres error: {0}")]
    Postgres(String),

    /// MongoDB driver error
    #[error("MongoDB error: {0}")]
    Mongodb(String),

    /// Redis driver error
    #[error("Redis error: {0}")]
    Redis(String),

    /// Elasticsearch driver error
    #[error("Elasticsearch error: {0}")]
    Elasticsearch(String),

    /// Generic backend error
    #[error("Backend error: {0}")]
    Other(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Backend(BackendError::Postgres(err.to_string()))
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        Error::Backend(BackendError::Mongodb(err.to_string()))
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Backend(BackendError::Redis(err.to_string()))
    }
}

impl From<elasticsearch::Error> for Error {
    fn from(err: elasticsearch::Error) -> Self {
        Error::Backend(BackendError::Elasticsearch(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
