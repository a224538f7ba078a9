//! Sensitive key names
//!
//! Matching is by whole key name, case-insensitive. Keys are stored
//! lower-cased.

use std::collections::HashSet;

pub const DEFAULT_SENSITIVE_KEYS: &[&str] =
    &["token", "key", "secret", "password", "privatekey", "private_key"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveKeySet {
    keys: HashSet<String>,
}

impl SensitiveKeySet {
    /// A set with no keys; nothing gets masked.
    pub fn empty() -> Self {
        Self { keys: HashSet::new() }
    }

    pub fn insert(&mut self, key: impl AsRef<str>) {
        self.keys.insert(key.as_ref().to_lowercase());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for SensitiveKeySet {
    fn default() -> Self {
        DEFAULT_SENSITIVE_KEYS.iter().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SensitiveKeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::empty();
        set.extend(iter);
        set
    }
}

impl<S: AsRef<str>> Extend<S> for SensitiveKeySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}
