//! Redactor implementation

use crate::config::RedactSettings;
use crate::document::Document;
use crate::redact::rules::SensitiveKeySet;
use serde_json::Value;

pub const DEFAULT_MASK: &str = "▬▬▬▬▬▬▬▬▬▬▬▬";

/// Produces display-safe copies of documents.
///
/// Values under a sensitive key are replaced by the mask whatever their type,
/// including whole objects and arrays. The output is for logs and terminals;
/// it is not meant to be persisted or merged back into a configuration.
#[derive(Debug, Clone)]
pub struct Redactor {
    keys: SensitiveKeySet,
    mask: String,
}

impl Redactor {
    pub fn new(keys: SensitiveKeySet) -> Self {
        Self { keys, mask: DEFAULT_MASK.to_string() }
    }

    /// Built-in key set extended with the configured keys and mask.
    pub fn from_settings(settings: &RedactSettings) -> Self {
        let mut keys = SensitiveKeySet::default();
        keys.extend(&settings.keys);
        let redactor = Self::new(keys);
        match &settings.mask {
            Some(mask) => redactor.with_mask(mask.clone()),
            None => redactor,
        }
    }

    pub fn with_mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = mask.into();
        self
    }

    pub fn keys(&self) -> &SensitiveKeySet {
        &self.keys
    }

    /// Return a redacted copy of `doc`; the input is left untouched.
    pub fn redact(&self, doc: &Document) -> Document {
        doc.iter()
            .map(|(key, value)| {
                let value = if self.keys.contains(key) {
                    Value::String(self.mask.clone())
                } else {
                    self.redact_value(value)
                };
                (key.clone(), value)
            })
            .collect()
    }

    fn redact_value(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.redact(map)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.redact_value(v)).collect())
            }
            scalar => scalar.clone(),
        }
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(SensitiveKeySet::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use similar_asserts::assert_eq;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn masks_sensitive_leaf_and_keeps_siblings() {
        let input = doc(json!({"user": {"password": "p1", "name": "bob"}}));
        let output = Redactor::default().redact(&input);
        assert_eq!(
            Value::Object(output),
            json!({"user": {"password": "▬▬▬▬▬▬▬▬▬▬▬▬", "name": "bob"}})
        );
    }

    #[test]
    fn key_match_ignores_case() {
        let input = doc(json!({"Password": "a", "PASSWORD": "b", "db": {"PrivateKey": "c"}}));
        let output = Redactor::default().redact(&input);
        assert_eq!(
            Value::Object(output),
            json!({
                "Password": DEFAULT_MASK,
                "PASSWORD": DEFAULT_MASK,
                "db": {"PrivateKey": DEFAULT_MASK}
            })
        );
    }

    #[test]
    fn input_is_not_mutated() {
        let input = doc(json!({"token": "abc"}));
        let _ = Redactor::default().redact(&input);
        assert_eq!(input.get("token"), Some(&json!("abc")));
    }

    #[test]
    fn arrays_keep_their_shape() {
        let input = doc(json!({"accounts": [{"name": "a", "secret": "s"}, 3, "x"]}));
        let output = Redactor::default().redact(&input);
        assert_eq!(
            Value::Object(output),
            json!({"accounts": [{"name": "a", "secret": DEFAULT_MASK}, 3, "x"]})
        );
    }

    #[test]
    fn non_string_sensitive_values_are_masked() {
        let input = doc(json!({"key": {"id": 1}, "token": 42, "secret": null}));
        let output = Redactor::default().redact(&input);
        assert_eq!(
            Value::Object(output),
            json!({"key": DEFAULT_MASK, "token": DEFAULT_MASK, "secret": DEFAULT_MASK})
        );
    }

    #[test]
    fn injected_key_set_and_mask() {
        let keys: SensitiveKeySet = ["apiKey"].into_iter().collect();
        let redactor = Redactor::new(keys).with_mask("***");
        let input = doc(json!({"apikey": "x", "password": "kept"}));
        assert_eq!(
            Value::Object(redactor.redact(&input)),
            json!({"apikey": "***", "password": "kept"})
        );
    }

    #[test]
    fn from_settings_extends_defaults() {
        let settings = RedactSettings { keys: vec!["walletSeed".to_string()], mask: None };
        let redactor = Redactor::from_settings(&settings);
        assert!(redactor.keys().contains("WALLETSEED"));
        assert!(redactor.keys().contains("password"));
    }
}
