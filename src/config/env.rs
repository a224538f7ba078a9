//! Environment variable provider

use crate::document::{set_path, Document};
use serde_json::Value;

const SEPARATOR: char = '_';

/// Build a document from variables named `<PREFIX>_<SEG>_<SEG>...`.
///
/// The prefix match is case-insensitive. The remainder of the name is
/// lower-cased and split on `_` into a nested path. Values that parse as JSON
/// keep their JSON type (`3` is a number, `true` a boolean, `{"a":1}` an
/// object); anything else is stored as a plain string.
///
/// Variables are applied in sorted name order, so the result does not depend
/// on how the environment lists them.
pub fn env_document<I, K, V>(prefix: &str, vars: I) -> Document
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let wanted = format!("{}{}", prefix.to_uppercase(), SEPARATOR);

    let mut matched: Vec<(String, String)> = Vec::new();
    for (name, raw) in vars {
        let name = name.as_ref();
        let Some(head) = name.get(..wanted.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(&wanted) {
            continue;
        }
        let remainder = name[wanted.len()..].to_lowercase();
        if remainder.is_empty() {
            continue;
        }
        matched.push((remainder, raw.into()));
    }

    // A path sorts before its extensions, so `APP_DB_HOST` lands on top of `APP_DB`.
    matched.sort();

    let mut doc = Document::new();
    for (remainder, raw) in matched {
        let path: Vec<&str> = remainder.split(SEPARATOR).collect();
        tracing::debug!("env override {}", remainder.replace(SEPARATOR, "."));
        set_path(&mut doc, &path, parse_literal(raw));
    }

    doc
}

/// Process environment document for `prefix`. Variables whose name or value
/// is not valid unicode are skipped.
pub fn process_env_document(prefix: &str) -> Document {
    let vars = std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)));
    env_document(prefix, vars)
}

pub(crate) fn parse_literal(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn nested_path_from_name() {
        let doc = env_document("APP", vars(&[("APP_DB_HOST", "localhost")]));
        assert_eq!(Value::Object(doc), json!({"db": {"host": "localhost"}}));
    }

    #[test]
    fn numeric_values_stay_numeric() {
        let doc = env_document("APP", vars(&[("APP_RETRIES", "3")]));
        assert_eq!(Value::Object(doc), json!({"retries": 3}));
    }

    #[test]
    fn structured_literals_are_parsed() {
        let doc = env_document(
            "APP",
            vars(&[
                ("APP_ENABLED", "false"),
                ("APP_LIMITS", r#"{"daily": 10, "tags": ["a"]}"#),
                ("APP_RATIO", "0.25"),
            ]),
        );
        assert_eq!(
            Value::Object(doc),
            json!({"enabled": false, "limits": {"daily": 10, "tags": ["a"]}, "ratio": 0.25})
        );
    }

    #[test]
    fn prefix_match_is_case_insensitive_and_needs_separator() {
        let doc = env_document(
            "app",
            vars(&[("APP_PORT", "1"), ("APPLICATION_PORT", "2"), ("OTHER_PORT", "3")]),
        );
        assert_eq!(Value::Object(doc), json!({"port": 1}));
    }

    #[test]
    fn nested_variable_wins_over_scalar_in_any_order() {
        let forward = env_document("APP", vars(&[("APP_DB_HOST", "x"), ("APP_DB", "5")]));
        let reverse = env_document("APP", vars(&[("APP_DB", "5"), ("APP_DB_HOST", "x")]));
        assert_eq!(forward, reverse);
        assert_eq!(Value::Object(forward), json!({"db": {"host": "x"}}));
    }

    #[test]
    fn bare_prefix_is_ignored() {
        let doc = env_document("APP", vars(&[("APP_", "x")]));
        assert!(doc.is_empty());
    }

    #[test]
    fn invalid_json_is_kept_as_string() {
        let doc = env_document("APP", vars(&[("APP_URL", "redis://host:6379/{0")]));
        assert_eq!(Value::Object(doc), json!({"url": "redis://host:6379/{0"}));
    }
}
