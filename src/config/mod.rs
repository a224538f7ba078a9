//! Configuration loading and merging
//!
//! Sources are layered with a fixed precedence: JSON files in the config
//! directory in path order, then environment variables on top.

pub mod decrypt;
pub mod env;
pub mod error;
pub mod loader;
pub mod settings;

pub use decrypt::{CommandDecryptor, Decryptor};
pub use env::env_document;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{CacheBackend, CacheSettings, RedactSettings, RuntimeSettings};
