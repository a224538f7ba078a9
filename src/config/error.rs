//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling the configuration. All of them are fatal:
/// no partial configuration is ever returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config directory or one of its files could not be read.
    #[error("Failed to read {path}: {source}")]
    FileSystem {
        /// Path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A source file is not valid JSON.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// Path to the malformed file.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A source file parsed, but its top level is not an object.
    #[error("Config file {path} must contain a JSON object at the top level")]
    NotAnObject {
        /// Path to the offending file.
        path: PathBuf,
    },

    /// The external decrypt step failed.
    #[error("Failed to decrypt config {path}: {message}")]
    Decryption {
        /// Path to the encrypted file.
        path: PathBuf,
        /// Diagnostic text from the decrypt command.
        message: String,
    },

    /// The merged document does not match the runtime settings schema.
    #[error("Invalid runtime settings: {0}")]
    Settings(#[source] serde_json::Error),
}
