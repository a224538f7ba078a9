//! Store error types.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by key-value stores. None of them are retried internally.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or the connection was lost.
    #[error("{backend} store unreachable: {source}")]
    Connection {
        backend: &'static str,
        #[source]
        source: BoxError,
    },

    /// A connection-bearing store was used before `start`.
    #[error("{backend} store used before start()")]
    NotStarted { backend: &'static str },

    /// The backend answered, but rejected the command.
    #[error("{backend} store error: {message}")]
    Backend { backend: &'static str, message: String },

    /// The stored text does not decode to the expected type.
    #[error("Failed to decode cached value for {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be serialized for storage.
    #[error("Failed to encode value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The bulk-delete pattern is not a valid glob.
    #[error("Invalid key pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    /// The backend does not offer this optional operation.
    #[error("{backend} store does not support {operation}")]
    Unsupported { backend: &'static str, operation: &'static str },
}

impl StoreError {
    pub fn connection(backend: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Connection { backend, source: source.into() }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::NotStarted { .. })
    }
}
