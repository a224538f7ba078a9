//! Typed view of the crate's own settings inside the merged document
//!
//! Only the `cache` and `redact` sections are read; everything else in the
//! document belongs to the application and is ignored here. Keys are single
//! words so they can be set through `<PREFIX>_CACHE_BACKEND` style variables.

use super::ConfigError;
use crate::document::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_SQLITE_PATH: &str = ".cache/baserate.sqlite";
pub const DEFAULT_SCAN_BATCH: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub cache: CacheSettings,
    pub redact: RedactSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    /// Redis connection URL.
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    /// SQLite database file.
    #[serde(deserialize_with = "lenient::path")]
    pub path: PathBuf,
    /// `COUNT` hint for each `SCAN` page during pattern deletes.
    pub batch: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            url: DEFAULT_REDIS_URL.to_string(),
            path: PathBuf::from(DEFAULT_SQLITE_PATH),
            batch: DEFAULT_SCAN_BATCH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RedactSettings {
    /// Extra sensitive key names, on top of the built-in set. A single name
    /// is accepted as a one-element list.
    #[serde(deserialize_with = "lenient::string_list")]
    pub keys: Vec<String>,
    /// Replacement text for masked values.
    #[serde(deserialize_with = "lenient::optional_string")]
    pub mask: Option<String>,
}

impl RuntimeSettings {
    pub fn from_document(doc: &Document) -> Result<Self, ConfigError> {
        let mut view = Document::new();
        for section in ["cache", "redact"] {
            if let Some(value) = doc.get(section) {
                view.insert(section.to_string(), value.clone());
            }
        }
        serde_json::from_value(Value::Object(view)).map_err(ConfigError::Settings)
    }
}

/// Text fields that also take the numbers and booleans produced by typed
/// environment values (`<PREFIX>_REDACT_MASK=0` arrives as the number `0`).
mod lenient {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;
    use std::path::PathBuf;

    fn scalar_text<E: Error>(value: Value) -> Result<String, E> {
        match value {
            Value::String(text) => Ok(text),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(E::custom(format!("expected a string, got {other}"))),
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        scalar_text(Value::deserialize(deserializer)?)
    }

    pub fn path<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PathBuf, D::Error> {
        string(deserializer).map(PathBuf::from)
    }

    pub fn optional_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            value => scalar_text(value).map(Some),
        }
    }

    pub fn string_list<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.into_iter().map(scalar_text).collect(),
            value => scalar_text(value).map(|text| vec![text]),
        }
    }
}
