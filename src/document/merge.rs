//! Deep merge of documents
//!
//! Objects merge key by key. Scalars and arrays from the overlay replace the
//! base value wholesale; arrays are never merged element-wise.

use super::Document;
use serde_json::Value;

/// Merge `overlay` into `base`, returning the combined document.
///
/// At any key present in both, the overlay's leaf wins. When both sides hold
/// an object the merge recurses; any other pairing takes the overlay value.
pub fn deep_merge(base: Document, overlay: Document) -> Document {
    let mut merged = base;
    for (key, incoming) in overlay {
        let combined = match (merged.remove(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                Value::Object(deep_merge(existing, incoming))
            }
            (_, incoming) => incoming,
        };
        merged.insert(key, combined);
    }
    merged
}

/// Fold documents left to right; later documents take precedence.
pub fn merge_all<I>(documents: I) -> Document
where
    I: IntoIterator<Item = Document>,
{
    documents.into_iter().fold(Document::new(), deep_merge)
}
