//! JSON-shaped configuration documents
//!
//! Every configuration source yields a [`Document`]; the merge and path
//! helpers here are the only operations the pipeline needs on them.

pub mod merge;
pub mod path;

pub use merge::{deep_merge, merge_all};
pub use path::set_path;

/// A nested mapping from string keys to JSON values.
pub type Document = serde_json::Map<String, serde_json::Value>;
