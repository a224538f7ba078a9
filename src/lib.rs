//! baserate: layered configuration and memoized computations for data scripts
//!
//! - [`config`] merges `*.json` / `*.enc.json` files and `<PREFIX>_*`
//!   environment variables into one [`document::Document`].
//! - [`redact`] masks sensitive values before the configuration is logged.
//! - [`store`] abstracts key-value backends (memory, Redis, SQLite).
//! - [`memo`] caches async computations in any store.
//! - [`app`] wires the pieces together for an entry point.

pub mod app;
pub mod cli;
pub mod config;
pub mod document;
pub mod memo;
pub mod redact;
pub mod store;

pub use document::Document;
