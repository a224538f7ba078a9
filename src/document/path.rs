//! Nested path assignment

use super::Document;
use serde_json::Value;

/// Set `value` at the nested `path` inside `doc`.
///
/// Missing intermediate objects are created. An intermediate that exists but
/// is not an object is replaced by an empty object, so the assignment always
/// succeeds. An empty path leaves the document untouched.
pub fn set_path<S: AsRef<str>>(doc: &mut Document, path: &[S], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = doc;
    for segment in parents {
        let slot = current
            .entry(segment.as_ref().to_string())
            .or_insert_with(|| Value::Object(Document::new()));
        if !slot.is_object() {
            *slot = Value::Object(Document::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just made an object"),
        };
    }
    current.insert(last.as_ref().to_string(), value);
}
